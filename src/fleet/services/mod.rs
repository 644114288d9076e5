//! Service layer for fleet checkout management.

mod engine;
mod ledger;
mod registry;
mod users;

pub use engine::{
    CheckoutEngine, CheckoutError, CheckoutErrorKind, CheckoutRequest, CheckoutResult,
    CheckoutSummary, DEFAULT_UPDATES_CHANNEL, ReleaseRequest, ReleaseSummary, TruckSummary,
};
pub use ledger::{ReservationLedgerError, ReservationLedgerResult, ReservationLedgerService};
pub use registry::{
    CreateTruckRequest, TruckRegistryError, TruckRegistryResult, TruckRegistryService,
};
pub use users::{UserDirectoryError, UserDirectoryResult, UserDirectoryService};
