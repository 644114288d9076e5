//! Truck aggregate.

use super::{CalendarId, FleetDomainError, TeamName, TruckId, TruckName};
use serde::{Deserialize, Serialize};

/// A provisioned vehicle in the shared fleet.
///
/// `is_checked_out` is the authoritative availability flag; only the checkout
/// engine flips it, and always in the same unit of work that creates or
/// releases the matching reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Truck {
    id: TruckId,
    name: TruckName,
    default_team: Option<TeamName>,
    calendar_id: CalendarId,
    is_checked_out: bool,
}

/// Parameter object for reconstructing a persisted truck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTruckData {
    /// Persisted truck identifier.
    pub id: TruckId,
    /// Persisted catalog name.
    pub name: TruckName,
    /// Persisted default team, if any.
    pub default_team: Option<TeamName>,
    /// Persisted calendar correlation id.
    pub calendar_id: CalendarId,
    /// Persisted availability flag.
    pub is_checked_out: bool,
}

impl Truck {
    /// Provisions a new truck record.
    #[must_use]
    pub fn new(
        name: TruckName,
        default_team: Option<TeamName>,
        calendar_id: CalendarId,
        is_checked_out: bool,
    ) -> Self {
        Self {
            id: TruckId::new(),
            name,
            default_team,
            calendar_id,
            is_checked_out,
        }
    }

    /// Reconstructs a truck from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTruckData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            default_team: data.default_team,
            calendar_id: data.calendar_id,
            is_checked_out: data.is_checked_out,
        }
    }

    /// Returns the truck identifier.
    #[must_use]
    pub const fn id(&self) -> TruckId {
        self.id
    }

    /// Returns the catalog name.
    #[must_use]
    pub const fn name(&self) -> TruckName {
        self.name
    }

    /// Returns the default team, if any.
    #[must_use]
    pub const fn default_team(&self) -> Option<TeamName> {
        self.default_team
    }

    /// Returns the calendar correlation id.
    #[must_use]
    pub const fn calendar_id(&self) -> CalendarId {
        self.calendar_id
    }

    /// Returns the availability flag.
    #[must_use]
    pub const fn is_checked_out(&self) -> bool {
        self.is_checked_out
    }

    /// Returns `true` when `team` differs from a configured default team.
    #[must_use]
    pub fn is_cross_team_for(&self, team: TeamName) -> bool {
        self.default_team.is_some_and(|default| default != team)
    }

    /// Re-points the default team.
    pub const fn assign_default_team(&mut self, team: Option<TeamName>) {
        self.default_team = team;
    }

    /// Flags the truck as checked out.
    ///
    /// # Errors
    ///
    /// Returns [`FleetDomainError::TruckAlreadyCheckedOut`] when the flag is
    /// already set.
    pub const fn check_out(&mut self) -> Result<(), FleetDomainError> {
        if self.is_checked_out {
            return Err(FleetDomainError::TruckAlreadyCheckedOut(self.name));
        }
        self.is_checked_out = true;
        Ok(())
    }

    /// Clears the checked-out flag.
    ///
    /// # Errors
    ///
    /// Returns [`FleetDomainError::TruckNotCheckedOut`] when the flag is not
    /// set.
    pub const fn release(&mut self) -> Result<(), FleetDomainError> {
        if !self.is_checked_out {
            return Err(FleetDomainError::TruckNotCheckedOut(self.name));
        }
        self.is_checked_out = false;
        Ok(())
    }
}
