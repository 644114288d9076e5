//! Outbound channel notifications.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Posts status text to a shared chat channel.
///
/// Delivery is best effort: callers log failures and carry on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpdateNotifier: Send + Sync {
    /// Posts `text` to `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError`] when the message could not be delivered.
    async fn post_update(&self, channel: &str, text: &str) -> Result<(), NotifierError>;
}

/// Errors returned by notifier implementations.
#[derive(Debug, Clone, Error)]
pub enum NotifierError {
    /// The channel rejected or dropped the message.
    #[error("could not post to {channel}: {reason}")]
    Rejected {
        /// Target channel.
        channel: String,
        /// Delivery failure description.
        reason: String,
    },

    /// Transport-layer failure.
    #[error("notifier transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotifierError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
