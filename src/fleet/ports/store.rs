//! Unit-of-work port spanning the registry, ledger and user directory.

use super::{FleetStoreError, ReservationLedger, TruckRegistry, UserDirectory};
use async_trait::async_trait;

/// Everything a single unit of work may read or write.
pub trait FleetTransaction: TruckRegistry + ReservationLedger + UserDirectory {}

impl<T> FleetTransaction for T where T: TruckRegistry + ReservationLedger + UserDirectory + ?Sized {}

/// Transactional fleet store.
///
/// `transaction` runs `work` atomically: when it returns `Ok`, every write
/// it made is committed together; when it returns `Err`, none of them are
/// visible. Implementations serialize units of work that touch the same
/// truck.
#[async_trait]
pub trait FleetStore: Send + Sync {
    /// Runs `work` as one unit of work.
    ///
    /// `work` is synchronous and must not wait on anything but the store
    /// itself; notifications and other outbound calls belong after commit.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `work`, or a
    /// [`FleetStoreError::Persistence`] (converted into `E`) when the store
    /// cannot begin or commit.
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        T: Send + 'static,
        E: From<FleetStoreError> + Send + 'static,
        F: FnOnce(&mut dyn FleetTransaction) -> Result<T, E> + Send + 'static;
}
