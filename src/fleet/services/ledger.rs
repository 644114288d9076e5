//! Read and audit access to the reservation ledger.

use crate::fleet::{
    domain::{ChatUserId, FleetDomainError, Reservation, ReservationId, TruckName},
    ports::{FleetStore, FleetStoreError},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for ledger operations.
#[derive(Debug, Error)]
pub enum ReservationLedgerError {
    /// Catalog validation failed.
    #[error(transparent)]
    Domain(#[from] FleetDomainError),
    /// The truck is not provisioned.
    #[error("truck not found: {0}")]
    TruckNotFound(TruckName),
    /// The reservation does not exist.
    #[error("reservation not found: {0}")]
    ReservationNotFound(ReservationId),
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] FleetStoreError),
}

/// Result type for ledger service operations.
pub type ReservationLedgerResult<T> = Result<T, ReservationLedgerError>;

/// Reservation ledger service.
///
/// Checkout and release go through [`super::CheckoutEngine`]; this service
/// covers direct inserts (seeding), lookups and the audit trail.
#[derive(Clone)]
pub struct ReservationLedgerService<S>
where
    S: FleetStore,
{
    store: Arc<S>,
}

impl<S> ReservationLedgerService<S>
where
    S: FleetStore,
{
    /// Creates a new ledger service.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Records a reservation without touching the truck flag.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationLedgerError::Store`] on a duplicate identifier, an
    /// unknown truck, or a store failure.
    pub async fn insert_reservation(
        &self,
        reservation: Reservation,
    ) -> ReservationLedgerResult<()> {
        self.store
            .transaction(move |tx| -> ReservationLedgerResult<()> {
                tx.insert_reservation(&reservation)?;
                Ok(())
            })
            .await
    }

    /// Finds a reservation by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationLedgerError::ReservationNotFound`] when absent.
    pub async fn reservation(&self, id: ReservationId) -> ReservationLedgerResult<Reservation> {
        self.store
            .transaction(move |tx| -> ReservationLedgerResult<Reservation> {
                tx.find_reservation(id)?
                    .ok_or(ReservationLedgerError::ReservationNotFound(id))
            })
            .await
    }

    /// Returns the reservation active for a truck at `as_of`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationLedgerError::TruckNotFound`] for an unprovisioned
    /// truck and [`ReservationLedgerError::Store`] carrying
    /// [`FleetStoreError::IntegrityViolation`] when more than one reservation
    /// is active.
    pub async fn active_for_truck(
        &self,
        truck_name: &str,
        as_of: DateTime<Utc>,
    ) -> ReservationLedgerResult<Option<Reservation>> {
        let name = TruckName::parse_normalized(truck_name)?;
        self.store
            .transaction(move |tx| -> ReservationLedgerResult<Option<Reservation>> {
                let truck = tx
                    .find_truck_by_name(name)?
                    .ok_or(ReservationLedgerError::TruckNotFound(name))?;
                Ok(tx.active_reservation_for_truck(truck.id(), as_of)?)
            })
            .await
    }

    /// Stamps release audit fields on one reservation.
    ///
    /// The truck flag is left alone; use the checkout engine to release a
    /// truck.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationLedgerError::Store`] carrying
    /// [`FleetStoreError::ReservationNotFound`] or
    /// [`FleetStoreError::AlreadyReleased`].
    pub async fn release_reservation(
        &self,
        id: ReservationId,
        released_by: ChatUserId,
        released_at: DateTime<Utc>,
    ) -> ReservationLedgerResult<()> {
        self.store
            .transaction(move |tx| -> ReservationLedgerResult<()> {
                tx.release_reservation(id, &released_by, released_at)?;
                Ok(())
            })
            .await
    }

    /// Returns the full audit trail for a truck, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationLedgerError::TruckNotFound`] for an unprovisioned
    /// truck.
    pub async fn history(&self, truck_name: &str) -> ReservationLedgerResult<Vec<Reservation>> {
        let name = TruckName::parse_normalized(truck_name)?;
        self.store
            .transaction(move |tx| -> ReservationLedgerResult<Vec<Reservation>> {
                let truck = tx
                    .find_truck_by_name(name)?
                    .ok_or(ReservationLedgerError::TruckNotFound(name))?;
                Ok(tx.reservation_history(truck.id())?)
            })
            .await
    }
}
