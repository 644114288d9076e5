//! User directory port.

use super::FleetStoreResult;
use crate::fleet::domain::{ChatUserId, UserProfile};

/// Durable access to user profiles within a unit of work.
pub trait UserDirectory {
    /// Finds the profile bound to a chat user.
    fn find_user(&mut self, chat_user_id: &ChatUserId) -> FleetStoreResult<Option<UserProfile>>;

    /// Stores a new profile.
    ///
    /// # Errors
    ///
    /// Returns [`super::FleetStoreError::DuplicateUser`] when the chat user
    /// already has a profile.
    fn insert_user(&mut self, user: &UserProfile) -> FleetStoreResult<()>;

    /// Persists the name and team of an existing profile.
    ///
    /// # Errors
    ///
    /// Returns [`super::FleetStoreError::UserNotFound`] when no profile exists.
    fn update_user(&mut self, user: &UserProfile) -> FleetStoreResult<()>;

    /// Returns every profile ordered by username.
    fn list_users(&mut self) -> FleetStoreResult<Vec<UserProfile>>;
}
