//! User profiles binding a chat identity to a team.

use super::{ChatUserId, FleetDomainError, TeamName, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Resolved chat-identity-to-team binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    id: UserId,
    chat_user_id: ChatUserId,
    username: String,
    team: TeamName,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted user profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedUserData {
    /// Persisted local identifier.
    pub id: UserId,
    /// Persisted chat-platform identifier.
    pub chat_user_id: ChatUserId,
    /// Persisted display name.
    pub username: String,
    /// Persisted team.
    pub team: TeamName,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Creates a new profile.
    ///
    /// # Errors
    ///
    /// Returns [`FleetDomainError::EmptyUserName`] when the display name is
    /// blank.
    pub fn new(
        chat_user_id: ChatUserId,
        username: &str,
        team: TeamName,
        clock: &impl Clock,
    ) -> Result<Self, FleetDomainError> {
        Ok(Self {
            id: UserId::new(),
            chat_user_id,
            username: validated_username(username)?,
            team,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs a profile from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedUserData) -> Self {
        Self {
            id: data.id,
            chat_user_id: data.chat_user_id,
            username: data.username,
            team: data.team,
            created_at: data.created_at,
        }
    }

    /// Returns the local identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the chat-platform identifier.
    #[must_use]
    pub const fn chat_user_id(&self) -> &ChatUserId {
        &self.chat_user_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the user's team.
    #[must_use]
    pub const fn team(&self) -> TeamName {
        self.team
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Moves the user to another team.
    pub const fn change_team(&mut self, team: TeamName) {
        self.team = team;
    }

    /// Refreshes the display name from the chat platform.
    ///
    /// # Errors
    ///
    /// Returns [`FleetDomainError::EmptyUserName`] when the name is blank.
    pub fn rename(&mut self, username: &str) -> Result<(), FleetDomainError> {
        self.username = validated_username(username)?;
        Ok(())
    }
}

fn validated_username(username: &str) -> Result<String, FleetDomainError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(FleetDomainError::EmptyUserName);
    }
    Ok(trimmed.to_owned())
}
