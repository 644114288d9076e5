//! Checkout and release engine.
//!
//! Every state change runs in a single unit of work that re-reads the truck
//! under lock, so two commands racing for the same truck cannot both win.
//! Channel updates are posted only after the unit of work commits.

use crate::fleet::{
    domain::{
        ChatUserId, CheckoutDays, CheckoutPolicy, FleetDomainError, FleetNotice, Requester,
        Reservation, ReservationId, ReservationWindow, TeamName, Truck, TruckName,
    },
    ports::{FleetStore, FleetStoreError, FleetTransaction, UpdateNotifier},
};
use chrono::{DateTime, Local, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Channel updates are posted to when none is configured.
pub const DEFAULT_UPDATES_CHANNEL: &str = "vehicle-updates";

/// Request payload for checking out a truck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    truck_name: String,
    days: i64,
    requester: Requester,
    purpose: Option<String>,
}

impl CheckoutRequest {
    /// Creates a one-day checkout request.
    #[must_use]
    pub fn new(truck_name: impl Into<String>, requester: Requester) -> Self {
        Self {
            truck_name: truck_name.into(),
            days: 1,
            requester,
            purpose: None,
        }
    }

    /// Sets the number of valid days, counting today.
    #[must_use]
    pub const fn with_days(mut self, days: i64) -> Self {
        self.days = days;
        self
    }

    /// Sets the free-text purpose.
    #[must_use]
    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }
}

/// Request payload for releasing a truck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    truck_name: String,
    user_id: ChatUserId,
    user_name: String,
}

impl ReleaseRequest {
    /// Creates a release request.
    #[must_use]
    pub fn new(
        truck_name: impl Into<String>,
        user_id: ChatUserId,
        user_name: impl Into<String>,
    ) -> Self {
        Self {
            truck_name: truck_name.into(),
            user_id,
            user_name: user_name.into(),
        }
    }
}

/// Outcome of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSummary {
    /// Ledger entry created for the checkout.
    pub reservation_id: ReservationId,
    /// Truck that was checked out.
    pub truck: TruckName,
    /// Number of valid days booked.
    pub days: CheckoutDays,
    /// Team the reservation is booked under.
    pub team: TeamName,
    /// Reserved window.
    pub window: ReservationWindow,
    /// Window rendered in local time.
    pub range: String,
}

/// Outcome of a successful release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSummary {
    /// Reservation that was closed.
    pub reservation_id: ReservationId,
    /// Truck that was released.
    pub truck: TruckName,
    /// Display name of the user who held the truck.
    pub previous_holder: String,
    /// Release instant.
    pub released_at: DateTime<Utc>,
}

/// One line of an availability listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruckSummary {
    /// Catalog name.
    pub name: TruckName,
    /// Default team, if any.
    pub default_team: Option<TeamName>,
    /// Availability flag.
    pub is_checked_out: bool,
}

impl From<&Truck> for TruckSummary {
    fn from(truck: &Truck) -> Self {
        Self {
            name: truck.name(),
            default_team: truck.default_team(),
            is_checked_out: truck.is_checked_out(),
        }
    }
}

/// Coarse classification of [`CheckoutError`] for callers deciding whether
/// to retry or what to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutErrorKind {
    /// A truck, reservation or user does not exist.
    NotFound,
    /// Input failed validation; the caller must correct it.
    Validation,
    /// The fleet state does not permit the transition.
    Conflict,
    /// The ledger holds more than one active reservation for a truck.
    IntegrityViolation,
    /// Infrastructure failure; the unit of work was rolled back.
    Transient,
}

/// Errors returned by the checkout engine.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The name is not in the catalog or the truck is not provisioned.
    #[error("truck not found: {0}")]
    TruckNotFound(String),
    /// The requested day count is not positive.
    #[error("invalid number of days: {0}")]
    InvalidDays(i64),
    /// The computed window closed before the request arrived.
    #[error("checkout window already closed at {0}")]
    WindowElapsed(DateTime<Utc>),
    /// The truck is held by an active reservation.
    #[error("truck {0} is already checked out")]
    AlreadyCheckedOut(TruckName),
    /// Release was requested for a truck that is not flagged.
    #[error("truck {0} is not checked out")]
    NotCheckedOut(TruckName),
    /// The truck is flagged but no reservation is active right now.
    #[error("truck {0} has no active reservation")]
    NoActiveReservation(TruckName),
    /// The policy forbids booking another team's truck.
    #[error("truck {truck} belongs to team {truck_team}, requester is on {requester_team}")]
    CrossTeamCheckout {
        /// Requested truck.
        truck: TruckName,
        /// The truck's default team.
        truck_team: TeamName,
        /// The requester's team.
        requester_team: TeamName,
    },
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] FleetDomainError),
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] FleetStoreError),
}

impl CheckoutError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> CheckoutErrorKind {
        match self {
            Self::TruckNotFound(_) => CheckoutErrorKind::NotFound,
            Self::InvalidDays(_) | Self::WindowElapsed(_) | Self::Domain(_) => {
                CheckoutErrorKind::Validation
            }
            Self::AlreadyCheckedOut(_)
            | Self::NotCheckedOut(_)
            | Self::NoActiveReservation(_)
            | Self::CrossTeamCheckout { .. } => CheckoutErrorKind::Conflict,
            Self::Store(store) => match store {
                FleetStoreError::TruckNotFound(_)
                | FleetStoreError::ReservationNotFound(_)
                | FleetStoreError::UserNotFound(_) => CheckoutErrorKind::NotFound,
                FleetStoreError::DuplicateTruckName(_)
                | FleetStoreError::DuplicateReservation(_)
                | FleetStoreError::DuplicateUser(_)
                | FleetStoreError::AlreadyReleased(_) => CheckoutErrorKind::Conflict,
                FleetStoreError::IntegrityViolation { .. } => {
                    CheckoutErrorKind::IntegrityViolation
                }
                FleetStoreError::Persistence(_) => CheckoutErrorKind::Transient,
            },
        }
    }

    /// Short reply suitable for the requesting user.
    ///
    /// Integrity and infrastructure failures collapse to a generic message
    /// that carries no internal identifiers.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::TruckNotFound(name) => format!("❌ Truck `{name}` not found."),
            Self::InvalidDays(_) => {
                "⚠️ Invalid number of days. Use a positive integer like `/checkout Tulip 4`"
                    .to_owned()
            }
            Self::WindowElapsed(_) => {
                "⚠️ Today's checkout window has already closed. Ask for more than one day instead."
                    .to_owned()
            }
            Self::AlreadyCheckedOut(name) => format!("🚫 Truck `{name}` is already checked out."),
            Self::NotCheckedOut(name) => {
                format!("ℹ️ Truck `{name}` is not currently checked out.")
            }
            Self::NoActiveReservation(name) => {
                format!("ℹ️ Truck `{name}` has no checkout running right now.")
            }
            Self::CrossTeamCheckout {
                truck, truck_team, ..
            } => format!(
                "🚫 Truck `{truck}` belongs to {}. Cross-team checkouts are turned off.",
                truck_team.display_name()
            ),
            Self::Domain(_) => "⚠️ Could not work out a checkout window for that request.".to_owned(),
            Self::Store(FleetStoreError::AlreadyReleased(_)) => {
                "ℹ️ That checkout was already released.".to_owned()
            }
            Self::Store(_) => "❌ Something went wrong. Please try again.".to_owned(),
        }
    }

    fn from_window(err: FleetDomainError) -> Self {
        match err {
            FleetDomainError::WindowElapsed(closed_at) => Self::WindowElapsed(closed_at),
            other => Self::Domain(other),
        }
    }
}

/// Result type for engine operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

/// Checkout and release state machine for the fleet.
#[derive(Clone)]
pub struct CheckoutEngine<S, N, C>
where
    S: FleetStore,
    N: UpdateNotifier,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    notifier: Arc<N>,
    clock: Arc<C>,
    policy: CheckoutPolicy,
    channel: String,
}

impl<S, N, C> CheckoutEngine<S, N, C>
where
    S: FleetStore,
    N: UpdateNotifier,
    C: Clock + Send + Sync,
{
    /// Creates an engine with the default policy and updates channel.
    #[must_use]
    pub fn new(store: Arc<S>, notifier: Arc<N>, clock: Arc<C>) -> Self {
        Self {
            store,
            notifier,
            clock,
            policy: CheckoutPolicy::default(),
            channel: DEFAULT_UPDATES_CHANNEL.to_owned(),
        }
    }

    /// Replaces the checkout policy.
    #[must_use]
    pub fn with_policy(mut self, policy: CheckoutPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the updates channel.
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// Returns the active policy.
    #[must_use]
    pub const fn policy(&self) -> &CheckoutPolicy {
        &self.policy
    }

    /// Checks out a truck for the requested number of valid days.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError`]; see [`CheckoutError::kind`] for the
    /// taxonomy. Nothing is persisted when an error is returned.
    pub async fn checkout(&self, request: CheckoutRequest) -> CheckoutResult<CheckoutSummary> {
        let CheckoutRequest {
            truck_name,
            days: requested_days,
            requester,
            purpose,
        } = request;
        let name = TruckName::parse_normalized(&truck_name)
            .map_err(|_| CheckoutError::TruckNotFound(truck_name.trim().to_owned()))?;
        let days = CheckoutDays::new(requested_days)
            .map_err(|_| CheckoutError::InvalidDays(requested_days))?;

        let now_local = self.clock.local();
        let window = ReservationWindow::for_checkout(&now_local, days, &self.policy)
            .map_err(CheckoutError::from_window)?;
        let now = now_local.with_timezone(&Utc);
        let allow_cross_team = self.policy.allow_cross_team_checkout;
        let user_name = requester.user_name.clone();
        let team = requester.team;

        let reservation = self
            .store
            .transaction(move |tx| -> CheckoutResult<Reservation> {
                let mut truck = tx
                    .lock_truck_by_name(name)?
                    .ok_or_else(|| CheckoutError::TruckNotFound(name.to_string()))?;
                expire_truck(tx, &mut truck, now)?;
                if truck.is_checked_out()
                    || tx.active_reservation_for_truck(truck.id(), now)?.is_some()
                {
                    return Err(CheckoutError::AlreadyCheckedOut(name));
                }
                if !allow_cross_team
                    && let Some(truck_team) = truck.default_team()
                    && truck_team != requester.team
                {
                    return Err(CheckoutError::CrossTeamCheckout {
                        truck: name,
                        truck_team,
                        requester_team: requester.team,
                    });
                }
                let reservation = Reservation::new(truck.id(), requester, window, purpose, now);
                tx.insert_reservation(&reservation)?;
                truck.check_out()?;
                tx.update_truck(&truck)?;
                Ok(reservation)
            })
            .await
            .inspect_err(|err| log_failure("checkout", name, err))?;

        info!(
            truck = %name,
            user = %reservation.requester().user_id,
            team = %team,
            days = days.value(),
            reservation = %reservation.id(),
            "truck checked out"
        );
        self.announce(FleetNotice::CheckedOut {
            user_name,
            truck: name,
            window,
        })
        .await;

        Ok(CheckoutSummary {
            reservation_id: reservation.id(),
            truck: name,
            days,
            team,
            window,
            range: window.describe(&Local),
        })
    }

    /// Releases a checked-out truck.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::TruckNotFound`],
    /// [`CheckoutError::NotCheckedOut`],
    /// [`CheckoutError::NoActiveReservation`], or a store failure. Nothing is
    /// persisted when an error is returned.
    pub async fn release(&self, request: ReleaseRequest) -> CheckoutResult<ReleaseSummary> {
        let ReleaseRequest {
            truck_name,
            user_id,
            user_name,
        } = request;
        let name = TruckName::parse_normalized(&truck_name)
            .map_err(|_| CheckoutError::TruckNotFound(truck_name.trim().to_owned()))?;
        let now = self.clock.utc();
        let released_by = user_id.clone();

        let released = self
            .store
            .transaction(move |tx| -> CheckoutResult<Reservation> {
                let mut truck = tx
                    .lock_truck_by_name(name)?
                    .ok_or_else(|| CheckoutError::TruckNotFound(name.to_string()))?;
                expire_truck(tx, &mut truck, now)?;
                if !truck.is_checked_out() {
                    return Err(CheckoutError::NotCheckedOut(name));
                }
                let active = tx
                    .active_reservation_for_truck(truck.id(), now)?
                    .ok_or(CheckoutError::NoActiveReservation(name))?;
                tx.release_reservation(active.id(), &released_by, now)?;
                truck.release()?;
                tx.update_truck(&truck)?;
                Ok(active)
            })
            .await
            .inspect_err(|err| log_failure("release", name, err))?;

        let previous_holder = released.requester().user_name.clone();
        info!(
            truck = %name,
            user = %user_id,
            reservation = %released.id(),
            "truck released"
        );
        self.announce(FleetNotice::Released {
            released_by: user_name,
            truck: name,
            previous_holder: Some(previous_holder.clone()),
        })
        .await;

        Ok(ReleaseSummary {
            reservation_id: released.id(),
            truck: name,
            previous_holder,
            released_at: now,
        })
    }

    /// Lists trucks whose flag and ledger agree on the requested state right
    /// now, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Store`] when the store fails.
    pub async fn list_availability(
        &self,
        want_checked_out: bool,
    ) -> CheckoutResult<Vec<TruckSummary>> {
        let now = self.clock.utc();
        self.store
            .transaction(move |tx| -> CheckoutResult<Vec<TruckSummary>> {
                expire_all(tx, now)?;
                let trucks = tx.trucks_by_availability(now, want_checked_out)?;
                Ok(trucks.iter().map(TruckSummary::from).collect())
            })
            .await
    }

    /// Releases every checked-out truck whose reservations have all lapsed,
    /// recording the `system` actor. Returns the trucks that became
    /// available.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Store`] when the store fails; nothing is
    /// released in that case.
    pub async fn expire_lapsed(&self) -> CheckoutResult<Vec<TruckName>> {
        let now = self.clock.utc();
        let expired = self
            .store
            .transaction(move |tx| expire_all(tx, now))
            .await?;
        for truck in &expired {
            info!(truck = %truck, "expired lapsed checkout");
        }
        Ok(expired)
    }

    async fn announce(&self, notice: FleetNotice) {
        let text = notice.render(&Local);
        if let Err(err) = self.notifier.post_update(&self.channel, &text).await {
            warn!(channel = %self.channel, error = %err, "failed to post fleet update");
        }
    }
}

/// Clears a checked-out truck whose open reservations have all ended,
/// stamping each as released by the `system` actor. A flagged truck with no
/// open reservation at all is cleared too. Returns `true` when the truck was
/// cleared.
fn expire_truck(
    tx: &mut dyn FleetTransaction,
    truck: &mut Truck,
    now: DateTime<Utc>,
) -> CheckoutResult<bool> {
    if !truck.is_checked_out() {
        return Ok(false);
    }
    let open = tx.open_reservations_for_truck(truck.id())?;
    if open.iter().any(|reservation| !reservation.has_lapsed_at(now)) {
        return Ok(false);
    }
    let system = ChatUserId::system();
    for reservation in &open {
        tx.release_reservation(reservation.id(), &system, now)?;
    }
    truck.release()?;
    tx.update_truck(truck)?;
    Ok(true)
}

/// Runs [`expire_truck`] over every flagged truck.
///
/// The unlocked listing only picks candidates. Each one is re-read under
/// its row lock before anything is decided, so a checkout committing
/// concurrently is seen rather than overwritten.
fn expire_all(tx: &mut dyn FleetTransaction, now: DateTime<Utc>) -> CheckoutResult<Vec<TruckName>> {
    let mut expired = Vec::new();
    for candidate in tx.list_trucks()? {
        if !candidate.is_checked_out() {
            continue;
        }
        let Some(mut truck) = tx.lock_truck_by_name(candidate.name())? else {
            continue;
        };
        if expire_truck(tx, &mut truck, now)? {
            expired.push(truck.name());
        }
    }
    Ok(expired)
}

fn log_failure(operation: &str, truck: TruckName, err: &CheckoutError) {
    match err.kind() {
        CheckoutErrorKind::IntegrityViolation | CheckoutErrorKind::Transient => {
            error!(operation, truck = %truck, error = %err, "fleet operation failed");
        }
        _ => info!(operation, truck = %truck, reason = %err, "fleet operation refused"),
    }
}
