//! Truck provisioning and lookup.

use crate::fleet::{
    domain::{CalendarId, FleetDomainError, TeamName, Truck, TruckName},
    ports::{FleetStore, FleetStoreError},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Request payload for provisioning a truck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTruckRequest {
    name: String,
    default_team: Option<String>,
    calendar_id: Option<CalendarId>,
    checked_out: bool,
}

impl CreateTruckRequest {
    /// Creates a request for an available truck with no default team.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_team: None,
            calendar_id: None,
            checked_out: false,
        }
    }

    /// Sets the default team.
    #[must_use]
    pub fn with_default_team(mut self, team: impl Into<String>) -> Self {
        self.default_team = Some(team.into());
        self
    }

    /// Sets the calendar correlation id. A fresh one is generated otherwise.
    #[must_use]
    pub const fn with_calendar_id(mut self, calendar_id: CalendarId) -> Self {
        self.calendar_id = Some(calendar_id);
        self
    }

    /// Sets the initial availability flag.
    #[must_use]
    pub const fn with_checked_out(mut self, checked_out: bool) -> Self {
        self.checked_out = checked_out;
        self
    }
}

/// Service-level errors for registry operations.
#[derive(Debug, Error)]
pub enum TruckRegistryError {
    /// Catalog validation failed.
    #[error(transparent)]
    Domain(#[from] FleetDomainError),
    /// The truck is not provisioned.
    #[error("truck not found: {0}")]
    NotFound(TruckName),
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] FleetStoreError),
}

/// Result type for registry service operations.
pub type TruckRegistryResult<T> = Result<T, TruckRegistryError>;

/// Truck registry service.
#[derive(Clone)]
pub struct TruckRegistryService<S>
where
    S: FleetStore,
{
    store: Arc<S>,
}

impl<S> TruckRegistryService<S>
where
    S: FleetStore,
{
    /// Creates a new registry service.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Provisions a truck.
    ///
    /// # Errors
    ///
    /// Returns [`TruckRegistryError::Domain`] when the name or team is not in
    /// the catalog, or [`TruckRegistryError::Store`] with
    /// [`FleetStoreError::DuplicateTruckName`] when the truck exists.
    pub async fn create_truck(&self, request: CreateTruckRequest) -> TruckRegistryResult<Truck> {
        let name = TruckName::try_from(request.name.as_str())?;
        let default_team = request
            .default_team
            .as_deref()
            .map(TeamName::try_from)
            .transpose()?;
        let truck = Truck::new(
            name,
            default_team,
            request.calendar_id.unwrap_or_default(),
            request.checked_out,
        );
        let stored = truck.clone();
        self.store
            .transaction(move |tx| -> TruckRegistryResult<()> {
                tx.insert_truck(&stored)?;
                Ok(())
            })
            .await?;
        Ok(truck)
    }

    /// Looks up a truck by name, title-casing the input first.
    ///
    /// # Errors
    ///
    /// Returns [`TruckRegistryError::Domain`] for names outside the catalog
    /// and [`TruckRegistryError::NotFound`] for catalog names that are not
    /// provisioned.
    pub async fn truck_by_name(&self, truck_name: &str) -> TruckRegistryResult<Truck> {
        let name = TruckName::parse_normalized(truck_name)?;
        self.store
            .transaction(move |tx| -> TruckRegistryResult<Truck> {
                tx.find_truck_by_name(name)?
                    .ok_or(TruckRegistryError::NotFound(name))
            })
            .await
    }

    /// Persists every field of a truck.
    ///
    /// # Errors
    ///
    /// Returns [`TruckRegistryError::Store`] when the truck does not exist or
    /// the store fails.
    pub async fn update_truck(&self, truck: Truck) -> TruckRegistryResult<()> {
        self.store
            .transaction(move |tx| -> TruckRegistryResult<()> {
                tx.update_truck(&truck)?;
                Ok(())
            })
            .await
    }

    /// Re-points a truck's default team; `None` clears it.
    ///
    /// # Errors
    ///
    /// Returns [`TruckRegistryError::Domain`] for an unknown truck or team
    /// and [`TruckRegistryError::NotFound`] when the truck is not
    /// provisioned.
    pub async fn assign_default_team(
        &self,
        truck_name: &str,
        team_name: Option<&str>,
    ) -> TruckRegistryResult<Truck> {
        let name = TruckName::parse_normalized(truck_name)?;
        let team = team_name.map(TeamName::try_from).transpose()?;
        self.store
            .transaction(move |tx| -> TruckRegistryResult<Truck> {
                let mut truck = tx
                    .find_truck_by_name(name)?
                    .ok_or(TruckRegistryError::NotFound(name))?;
                truck.assign_default_team(team);
                tx.update_truck(&truck)?;
                Ok(truck)
            })
            .await
    }

    /// Returns every provisioned truck ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`TruckRegistryError::Store`] when the store fails.
    pub async fn list_trucks(&self) -> TruckRegistryResult<Vec<Truck>> {
        self.store
            .transaction(|tx| -> TruckRegistryResult<Vec<Truck>> { Ok(tx.list_trucks()?) })
            .await
    }

    /// Returns trucks whose flag and ledger agree on `want_checked_out` at
    /// `as_of`, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`TruckRegistryError::Store`] when the store fails.
    pub async fn list_by_availability(
        &self,
        as_of: DateTime<Utc>,
        want_checked_out: bool,
    ) -> TruckRegistryResult<Vec<Truck>> {
        self.store
            .transaction(move |tx| -> TruckRegistryResult<Vec<Truck>> {
                Ok(tx.trucks_by_availability(as_of, want_checked_out)?)
            })
            .await
    }
}
