//! Chat identity to team resolution.

use crate::fleet::{
    domain::{ChatUserId, FleetDomainError, TeamName, UserProfile},
    ports::{FleetStore, FleetStoreError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Service-level errors for user directory operations.
#[derive(Debug, Error)]
pub enum UserDirectoryError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] FleetDomainError),
    /// The chat user has no profile yet.
    #[error("no profile for user {0}")]
    NotFound(ChatUserId),
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] FleetStoreError),
}

/// Result type for user directory operations.
pub type UserDirectoryResult<T> = Result<T, UserDirectoryError>;

/// User directory service.
#[derive(Clone)]
pub struct UserDirectoryService<S, C>
where
    S: FleetStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> UserDirectoryService<S, C>
where
    S: FleetStore,
    C: Clock + Send + Sync,
{
    /// Creates a new user directory service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Returns the existing profile for a chat user, or creates one bound to
    /// `team`.
    ///
    /// An existing profile keeps its team; only the display name is
    /// refreshed.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError::Domain`] for a blank id or name, and
    /// [`UserDirectoryError::Store`] when the store fails.
    pub async fn resolve_or_create(
        &self,
        user_id: &str,
        user_name: &str,
        team: TeamName,
    ) -> UserDirectoryResult<UserProfile> {
        let chat_user_id = ChatUserId::new(user_id)?;
        let candidate = UserProfile::new(chat_user_id.clone(), user_name, team, &*self.clock)?;
        self.store
            .transaction(move |tx| -> UserDirectoryResult<UserProfile> {
                if let Some(mut existing) = tx.find_user(&chat_user_id)? {
                    if existing.username() != candidate.username() {
                        existing.rename(candidate.username())?;
                        tx.update_user(&existing)?;
                    }
                    return Ok(existing);
                }
                tx.insert_user(&candidate)?;
                info!(user = %chat_user_id, team = %team, "created user profile");
                Ok(candidate)
            })
            .await
    }

    /// Finds the profile for a chat user.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError::Domain`] for a blank id and
    /// [`UserDirectoryError::Store`] when the store fails.
    pub async fn find(&self, user_id: &str) -> UserDirectoryResult<Option<UserProfile>> {
        let chat_user_id = ChatUserId::new(user_id)?;
        self.store
            .transaction(move |tx| -> UserDirectoryResult<Option<UserProfile>> {
                Ok(tx.find_user(&chat_user_id)?)
            })
            .await
    }

    /// Moves an existing user to another team.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError::NotFound`] when the user has no profile.
    pub async fn change_team(
        &self,
        user_id: &str,
        team: TeamName,
    ) -> UserDirectoryResult<UserProfile> {
        let chat_user_id = ChatUserId::new(user_id)?;
        self.store
            .transaction(move |tx| -> UserDirectoryResult<UserProfile> {
                let mut profile = tx
                    .find_user(&chat_user_id)?
                    .ok_or_else(|| UserDirectoryError::NotFound(chat_user_id.clone()))?;
                profile.change_team(team);
                tx.update_user(&profile)?;
                Ok(profile)
            })
            .await
    }

    /// Returns every profile ordered by username.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError::Store`] when the store fails.
    pub async fn list(&self) -> UserDirectoryResult<Vec<UserProfile>> {
        self.store
            .transaction(|tx| -> UserDirectoryResult<Vec<UserProfile>> { Ok(tx.list_users()?) })
            .await
    }
}
