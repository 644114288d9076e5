//! Truck registry port.

use super::FleetStoreResult;
use crate::fleet::domain::{Truck, TruckId, TruckName};
use chrono::{DateTime, Utc};

/// Durable access to truck records within a unit of work.
pub trait TruckRegistry {
    /// Stores a newly provisioned truck.
    ///
    /// # Errors
    ///
    /// Returns [`super::FleetStoreError::DuplicateTruckName`] when the name is
    /// already provisioned.
    fn insert_truck(&mut self, truck: &Truck) -> FleetStoreResult<()>;

    /// Finds a truck by catalog name.
    fn find_truck_by_name(&mut self, name: TruckName) -> FleetStoreResult<Option<Truck>>;

    /// Finds a truck by catalog name and holds it against concurrent writers
    /// until the unit of work ends.
    fn lock_truck_by_name(&mut self, name: TruckName) -> FleetStoreResult<Option<Truck>>;

    /// Finds a truck by identifier.
    fn find_truck_by_id(&mut self, id: TruckId) -> FleetStoreResult<Option<Truck>>;

    /// Persists every field of an existing truck.
    ///
    /// # Errors
    ///
    /// Returns [`super::FleetStoreError::TruckNotFound`] when the truck does
    /// not exist, or [`super::FleetStoreError::DuplicateTruckName`] when the
    /// new name belongs to another truck.
    fn update_truck(&mut self, truck: &Truck) -> FleetStoreResult<()>;

    /// Returns every provisioned truck ordered by name.
    fn list_trucks(&mut self) -> FleetStoreResult<Vec<Truck>>;

    /// Returns trucks whose flag equals `want_checked_out` and whose ledger
    /// agrees at `as_of`: an unreleased reservation containing `as_of` exists
    /// exactly when `want_checked_out` is `true`. Ordered by name.
    fn trucks_by_availability(
        &mut self,
        as_of: DateTime<Utc>,
        want_checked_out: bool,
    ) -> FleetStoreResult<Vec<Truck>>;
}
