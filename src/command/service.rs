//! Chat command orchestration.

use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use super::{
    CommandError, CommandUsageError, SlashCommand,
    replies::{self, GENERIC_FAILURE, NO_TEAM, PROFILE_FAILURE, SELECTION_FAILURE},
};
use crate::fleet::{
    domain::{ChatUserId, Requester, TeamName, TruckName},
    ports::{FleetStore, UpdateNotifier},
    services::{
        CheckoutEngine, CheckoutError, CheckoutRequest, CheckoutResult, CheckoutSummary,
        ReleaseRequest, TruckRegistryError, TruckRegistryService, UserDirectoryError,
        UserDirectoryService,
    },
};

/// Result type for command handling.
pub type CommandResult<T> = Result<T, CommandError>;

/// A chat command line together with the caller's identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    /// Chat-platform user id of the caller.
    pub user_id: String,
    /// Display name of the caller.
    pub user_name: String,
    /// Full command line, e.g. `/checkout Tulip 4`.
    pub text: String,
}

impl CommandRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            text: text.into(),
        }
    }
}

/// A checkout parked until a first-time user picks their team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCheckout {
    /// Resolved truck.
    pub truck: TruckName,
    /// Requested number of valid days.
    pub days: i64,
    /// Chat-platform user id of the requester.
    pub user_id: String,
    /// Display name of the requester.
    pub user_name: String,
}

impl PendingCheckout {
    /// Encodes the checkout as opaque modal metadata.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Metadata`] when encoding fails.
    pub fn to_metadata(&self) -> CommandResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes metadata produced by [`PendingCheckout::to_metadata`].
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Metadata`] when the metadata is malformed.
    pub fn from_metadata(metadata: &str) -> CommandResult<Self> {
        Ok(serde_json::from_str(metadata)?)
    }
}

/// One selectable team in a team prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamOption {
    /// Value submitted back by the chat platform.
    pub value: &'static str,
    /// Human-readable label.
    pub label: String,
}

/// Team-selection prompt for a first-time user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamPrompt {
    /// Prompt text.
    pub text: String,
    /// Every catalogued team.
    pub options: Vec<TeamOption>,
    /// Encoded [`PendingCheckout`] to hand back with the selection.
    pub metadata: String,
}

/// Reply to a chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    /// Plain reply text.
    Text(String),
    /// The caller must pick a team before the checkout can run.
    SelectTeam(TeamPrompt),
}

impl CommandReply {
    /// Returns the text shown to the caller.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::SelectTeam(prompt) => &prompt.text,
        }
    }
}

/// Turns chat commands into engine calls and reply text.
pub struct CommandService<S, N, C>
where
    S: FleetStore,
    N: UpdateNotifier,
    C: Clock + Send + Sync,
{
    engine: CheckoutEngine<S, N, C>,
    registry: TruckRegistryService<S>,
    users: UserDirectoryService<S, C>,
}

impl<S, N, C> CommandService<S, N, C>
where
    S: FleetStore,
    N: UpdateNotifier,
    C: Clock + Send + Sync,
{
    /// Creates a command service.
    #[must_use]
    pub const fn new(
        engine: CheckoutEngine<S, N, C>,
        registry: TruckRegistryService<S>,
        users: UserDirectoryService<S, C>,
    ) -> Self {
        Self {
            engine,
            registry,
            users,
        }
    }

    /// Returns the engine commands are dispatched to.
    #[must_use]
    pub const fn engine(&self) -> &CheckoutEngine<S, N, C> {
        &self.engine
    }

    /// Handles one chat command.
    ///
    /// Usage mistakes and refused transitions come back as reply text.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] only when a reply cannot be rendered.
    pub async fn handle(&self, request: CommandRequest) -> CommandResult<CommandReply> {
        let max_days = self.engine.policy().max_checkout_days;
        let command = match SlashCommand::parse(&request.text, max_days) {
            Ok(command) => command,
            Err(usage) => {
                debug!(user = %request.user_id, reason = %usage, "answered with usage hint");
                return Ok(CommandReply::Text(usage.user_message()));
            }
        };
        debug!(user = %request.user_id, command = ?command, "handling chat command");

        match command {
            SlashCommand::Checkout { truck, days } => self.checkout(&request, &truck, days).await,
            SlashCommand::Release { truck } => {
                self.release(&request, truck).await.map(CommandReply::Text)
            }
            SlashCommand::Trucks { checked_out } => {
                self.list(checked_out).await.map(CommandReply::Text)
            }
            SlashCommand::Team { team } => self
                .team(&request, team.as_deref())
                .await
                .map(CommandReply::Text),
        }
    }

    /// Finishes a checkout parked behind a team prompt: creates the
    /// caller's profile with `team` and runs the checkout.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] only when a reply cannot be rendered.
    pub async fn complete_team_selection(
        &self,
        metadata: &str,
        team: &str,
    ) -> CommandResult<CommandReply> {
        let pending = match PendingCheckout::from_metadata(metadata) {
            Ok(pending) => pending,
            Err(err) => {
                warn!(error = %err, "discarding malformed team selection");
                return Ok(CommandReply::Text(SELECTION_FAILURE.to_owned()));
            }
        };
        let max_days = self.engine.policy().max_checkout_days;
        if pending.days > i64::from(max_days) {
            warn!(user = %pending.user_id, days = pending.days, "pending checkout exceeds the maximum");
            let usage = CommandUsageError::TooManyDays {
                requested: pending.days,
                max: max_days,
            };
            return Ok(CommandReply::Text(usage.user_message()));
        }
        let Some(selected) = parse_team(team) else {
            return replies::unknown_team(team.trim()).map(CommandReply::Text);
        };
        let profile = match self
            .users
            .resolve_or_create(&pending.user_id, &pending.user_name, selected)
            .await
        {
            Ok(profile) => profile,
            Err(err) => {
                error!(user = %pending.user_id, team = %selected, error = %err, "failed to create user profile");
                return Ok(CommandReply::Text(PROFILE_FAILURE.to_owned()));
            }
        };

        let reply = match self.run_checkout(&pending, profile.team()).await {
            Ok(summary) => replies::welcome(profile.team(), &replies::checkout_success(&summary)?)?,
            Err(err) => err.user_message(),
        };
        Ok(CommandReply::Text(reply))
    }

    async fn checkout(
        &self,
        request: &CommandRequest,
        truck_input: &str,
        days: i64,
    ) -> CommandResult<CommandReply> {
        let truck = match self.registry.truck_by_name(truck_input).await {
            Ok(truck) => truck,
            Err(TruckRegistryError::Domain(_) | TruckRegistryError::NotFound(_)) => {
                let missing = CheckoutError::TruckNotFound(truck_input.trim().to_owned());
                return Ok(CommandReply::Text(missing.user_message()));
            }
            Err(err) => {
                error!(truck = truck_input, error = %err, "truck lookup failed");
                return Ok(CommandReply::Text(GENERIC_FAILURE.to_owned()));
            }
        };
        let pending = PendingCheckout {
            truck: truck.name(),
            days,
            user_id: request.user_id.clone(),
            user_name: request.user_name.clone(),
        };

        let profile = match self.users.find(&request.user_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => return prompt_for_team(&pending),
            Err(err) => {
                error!(user = %request.user_id, error = %err, "user lookup failed");
                return Ok(CommandReply::Text(GENERIC_FAILURE.to_owned()));
            }
        };

        let reply = match self.run_checkout(&pending, profile.team()).await {
            Ok(summary) => replies::checkout_success(&summary)?,
            Err(err) => err.user_message(),
        };
        Ok(CommandReply::Text(reply))
    }

    async fn run_checkout(
        &self,
        pending: &PendingCheckout,
        team: TeamName,
    ) -> CheckoutResult<CheckoutSummary> {
        let requester = Requester {
            user_id: ChatUserId::new(pending.user_id.as_str())?,
            user_name: pending.user_name.clone(),
            team,
        };
        let request = CheckoutRequest::new(pending.truck.as_str(), requester)
            .with_days(pending.days)
            .with_purpose(format!(
                "Quick checkout via slash command ({} business days)",
                pending.days
            ));
        self.engine.checkout(request).await
    }

    async fn release(&self, request: &CommandRequest, truck: String) -> CommandResult<String> {
        let Ok(user_id) = ChatUserId::new(request.user_id.as_str()) else {
            return Ok(GENERIC_FAILURE.to_owned());
        };
        let release = ReleaseRequest::new(truck, user_id, request.user_name.as_str());
        match self.engine.release(release).await {
            Ok(summary) => replies::release_success(&summary),
            Err(err) => Ok(err.user_message()),
        }
    }

    async fn list(&self, checked_out: bool) -> CommandResult<String> {
        match self.engine.list_availability(checked_out).await {
            Ok(trucks) => replies::truck_list(&trucks, checked_out),
            Err(err) => {
                error!(checked_out, error = %err, "availability listing failed");
                Ok(if checked_out {
                    "❌ Could not retrieve checked-out trucks.".to_owned()
                } else {
                    "❌ Could not retrieve available trucks.".to_owned()
                })
            }
        }
    }

    async fn team(&self, request: &CommandRequest, requested: Option<&str>) -> CommandResult<String> {
        let Some(raw_team) = requested else {
            return match self.users.find(&request.user_id).await {
                Ok(Some(profile)) => replies::team_current(profile.team()),
                Ok(None) => Ok(NO_TEAM.to_owned()),
                Err(err) => {
                    error!(user = %request.user_id, error = %err, "user lookup failed");
                    Ok(GENERIC_FAILURE.to_owned())
                }
            };
        };
        let Some(team) = parse_team(raw_team) else {
            return replies::unknown_team(raw_team);
        };

        let changed = match self.users.change_team(&request.user_id, team).await {
            Err(UserDirectoryError::NotFound(_)) => {
                self.users
                    .resolve_or_create(&request.user_id, &request.user_name, team)
                    .await
            }
            other => other,
        };
        match changed {
            Ok(profile) => replies::team_changed(profile.team()),
            Err(err) => {
                error!(user = %request.user_id, team = %team, error = %err, "team change failed");
                Ok(GENERIC_FAILURE.to_owned())
            }
        }
    }
}

/// Team names are matched case-insensitively, so `Beltline` selects
/// `beltline` from both the prompt and `/team`.
fn parse_team(raw: &str) -> Option<TeamName> {
    TeamName::try_from(raw.trim().to_ascii_lowercase().as_str()).ok()
}

fn prompt_for_team(pending: &PendingCheckout) -> CommandResult<CommandReply> {
    let options = TeamName::ALL
        .iter()
        .map(|team| TeamOption {
            value: team.as_str(),
            label: team.display_name(),
        })
        .collect();
    debug!(user = %pending.user_id, truck = %pending.truck, "prompting for team");
    Ok(CommandReply::SelectTeam(TeamPrompt {
        text: replies::team_prompt(pending.truck)?,
        options,
        metadata: pending.to_metadata()?,
    }))
}
