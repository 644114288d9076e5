//! Port contracts for fleet checkout management.
//!
//! Ports define infrastructure-agnostic interfaces used by fleet services.
//! The registry, ledger and user directory are synchronous views that only
//! exist inside a unit of work opened through [`FleetStore`].

pub mod error;
pub mod ledger;
pub mod notifier;
pub mod registry;
pub mod store;
pub mod users;

pub use error::{FleetStoreError, FleetStoreResult};
pub use ledger::{ReservationLedger, single_active};
pub use notifier::{NotifierError, UpdateNotifier};
pub use registry::TruckRegistry;
pub use store::{FleetStore, FleetTransaction};
pub use users::UserDirectory;

#[cfg(test)]
pub use notifier::MockUpdateNotifier;
