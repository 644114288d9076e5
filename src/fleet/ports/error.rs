//! Errors shared by the fleet store ports.

use crate::fleet::domain::{ChatUserId, ReservationId, TruckId, TruckName};
use std::sync::Arc;
use thiserror::Error;

/// Result type for fleet store operations.
pub type FleetStoreResult<T> = Result<T, FleetStoreError>;

/// Errors returned by fleet store implementations.
#[derive(Debug, Clone, Error)]
pub enum FleetStoreError {
    /// A truck with the same catalog name is already provisioned.
    #[error("duplicate truck name: {0}")]
    DuplicateTruckName(TruckName),

    /// The truck record does not exist.
    #[error("truck not found: {0}")]
    TruckNotFound(TruckId),

    /// A reservation with the same identifier already exists.
    #[error("duplicate reservation identifier: {0}")]
    DuplicateReservation(ReservationId),

    /// The reservation does not exist.
    #[error("reservation not found: {0}")]
    ReservationNotFound(ReservationId),

    /// The reservation carries release audit fields already.
    #[error("reservation already released: {0}")]
    AlreadyReleased(ReservationId),

    /// A profile for the chat user already exists.
    #[error("duplicate user profile: {0}")]
    DuplicateUser(ChatUserId),

    /// The user profile does not exist.
    #[error("user not found: {0}")]
    UserNotFound(ChatUserId),

    /// More than one active reservation matched a truck.
    #[error("{count} active reservations found for truck {truck_id}")]
    IntegrityViolation {
        /// Truck whose ledger is inconsistent.
        truck_id: TruckId,
        /// Number of simultaneously active reservations.
        count: usize,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl FleetStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns `true` for infrastructure failures a caller may retry.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}
