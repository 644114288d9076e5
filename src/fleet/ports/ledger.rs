//! Reservation ledger port.

use super::{FleetStoreError, FleetStoreResult};
use crate::fleet::domain::{ChatUserId, Reservation, ReservationId, TruckId};
use chrono::{DateTime, Utc};

/// Durable access to reservation records within a unit of work.
///
/// Reservations are never deleted; release stamps audit fields in place.
pub trait ReservationLedger {
    /// Stores a new reservation.
    ///
    /// # Errors
    ///
    /// Returns [`FleetStoreError::DuplicateReservation`] when the identifier
    /// exists or [`FleetStoreError::TruckNotFound`] when the truck does not.
    fn insert_reservation(&mut self, reservation: &Reservation) -> FleetStoreResult<()>;

    /// Finds a reservation by identifier.
    fn find_reservation(&mut self, id: ReservationId) -> FleetStoreResult<Option<Reservation>>;

    /// Returns the reservation active for `truck_id` at `as_of`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`FleetStoreError::IntegrityViolation`] when more than one
    /// reservation is active.
    fn active_reservation_for_truck(
        &mut self,
        truck_id: TruckId,
        as_of: DateTime<Utc>,
    ) -> FleetStoreResult<Option<Reservation>>;

    /// Stamps release audit fields on a reservation.
    ///
    /// # Errors
    ///
    /// Returns [`FleetStoreError::ReservationNotFound`] when the reservation
    /// does not exist or [`FleetStoreError::AlreadyReleased`] on a second
    /// release.
    fn release_reservation(
        &mut self,
        id: ReservationId,
        released_by: &ChatUserId,
        released_at: DateTime<Utc>,
    ) -> FleetStoreResult<()>;

    /// Returns unreleased reservations for a truck regardless of window,
    /// oldest first.
    fn open_reservations_for_truck(&mut self, truck_id: TruckId)
    -> FleetStoreResult<Vec<Reservation>>;

    /// Returns every reservation for a truck, newest first.
    fn reservation_history(&mut self, truck_id: TruckId) -> FleetStoreResult<Vec<Reservation>>;
}

/// Collapses candidate rows to the single active reservation.
///
/// Adapters call this instead of ordering and truncating, so a second active
/// row is reported rather than hidden.
///
/// # Errors
///
/// Returns [`FleetStoreError::IntegrityViolation`] when more than one
/// candidate remains.
pub fn single_active(
    truck_id: TruckId,
    mut candidates: Vec<Reservation>,
) -> FleetStoreResult<Option<Reservation>> {
    match candidates.len() {
        0 | 1 => Ok(candidates.pop()),
        count => Err(FleetStoreError::IntegrityViolation { truck_id, count }),
    }
}
