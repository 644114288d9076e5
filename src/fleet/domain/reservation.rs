//! Reservation (checkout) records and their release audit trail.

use super::{ChatUserId, FleetDomainError, ReservationId, ReservationWindow, TeamName, TruckId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who released a reservation and when. Both fields are recorded together,
/// exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    released_by: ChatUserId,
    released_at: DateTime<Utc>,
}

impl ReleaseRecord {
    /// Creates a release record.
    #[must_use]
    pub const fn new(released_by: ChatUserId, released_at: DateTime<Utc>) -> Self {
        Self {
            released_by,
            released_at,
        }
    }

    /// Returns the releasing user.
    #[must_use]
    pub const fn released_by(&self) -> &ChatUserId {
        &self.released_by
    }

    /// Returns the release instant.
    #[must_use]
    pub const fn released_at(&self) -> DateTime<Utc> {
        self.released_at
    }
}

/// Requester details captured on a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    /// Chat-platform user id.
    pub user_id: ChatUserId,
    /// Display name at checkout time.
    pub user_name: String,
    /// Team the reservation is booked under.
    pub team: TeamName,
}

/// A single reservation window for one truck by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    id: ReservationId,
    truck_id: TruckId,
    requester: Requester,
    window: ReservationWindow,
    purpose: Option<String>,
    created_at: DateTime<Utc>,
    release: Option<ReleaseRecord>,
}

/// Parameter object for reconstructing a persisted reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedReservationData {
    /// Persisted reservation identifier.
    pub id: ReservationId,
    /// Reserved truck.
    pub truck_id: TruckId,
    /// Persisted requester details.
    pub requester: Requester,
    /// Persisted window.
    pub window: ReservationWindow,
    /// Persisted free-text purpose.
    pub purpose: Option<String>,
    /// Persisted insertion timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted release audit fields.
    pub release: Option<ReleaseRecord>,
}

impl Reservation {
    /// Creates a new, unreleased reservation.
    #[must_use]
    pub fn new(
        truck_id: TruckId,
        requester: Requester,
        window: ReservationWindow,
        purpose: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ReservationId::new(),
            truck_id,
            requester,
            window,
            purpose: purpose.filter(|text| !text.trim().is_empty()),
            created_at,
            release: None,
        }
    }

    /// Reconstructs a reservation from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedReservationData) -> Self {
        Self {
            id: data.id,
            truck_id: data.truck_id,
            requester: data.requester,
            window: data.window,
            purpose: data.purpose,
            created_at: data.created_at,
            release: data.release,
        }
    }

    /// Returns the reservation identifier.
    #[must_use]
    pub const fn id(&self) -> ReservationId {
        self.id
    }

    /// Returns the reserved truck.
    #[must_use]
    pub const fn truck_id(&self) -> TruckId {
        self.truck_id
    }

    /// Returns the requester details.
    #[must_use]
    pub const fn requester(&self) -> &Requester {
        &self.requester
    }

    /// Returns the reservation window.
    #[must_use]
    pub const fn window(&self) -> ReservationWindow {
        self.window
    }

    /// Returns the free-text purpose, if any.
    #[must_use]
    pub fn purpose(&self) -> Option<&str> {
        self.purpose.as_deref()
    }

    /// Returns the insertion timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the release audit record, if released.
    #[must_use]
    pub const fn release_record(&self) -> Option<&ReleaseRecord> {
        self.release.as_ref()
    }

    /// Returns `true` once release audit fields are set.
    #[must_use]
    pub const fn is_released(&self) -> bool {
        self.release.is_some()
    }

    /// Returns `true` when unreleased and the window contains `instant`.
    #[must_use]
    pub fn is_active_at(&self, instant: DateTime<Utc>) -> bool {
        !self.is_released() && self.window.contains(instant)
    }

    /// Returns `true` when unreleased and the window closed by `instant`.
    #[must_use]
    pub fn has_lapsed_at(&self, instant: DateTime<Utc>) -> bool {
        !self.is_released() && self.window.has_ended_by(instant)
    }

    /// Stamps release audit fields.
    ///
    /// # Errors
    ///
    /// Returns [`FleetDomainError::ReservationAlreadyReleased`] on a second
    /// release.
    pub fn release(
        &mut self,
        released_by: ChatUserId,
        released_at: DateTime<Utc>,
    ) -> Result<(), FleetDomainError> {
        if self.is_released() {
            return Err(FleetDomainError::ReservationAlreadyReleased(self.id));
        }
        self.release = Some(ReleaseRecord::new(released_by, released_at));
        Ok(())
    }
}
