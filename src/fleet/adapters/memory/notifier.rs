//! Notifier that records posted updates in memory.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::fleet::ports::{NotifierError, UpdateNotifier};

/// A posted channel update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedUpdate {
    /// Channel the update was posted to.
    pub channel: String,
    /// Rendered update text.
    pub text: String,
}

/// Thread-safe notifier that keeps every update it accepts.
///
/// A rejecting notifier refuses every post, which lets callers exercise the
/// best-effort delivery path.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    posted: Arc<Mutex<Vec<PostedUpdate>>>,
    reject: bool,
}

impl RecordingNotifier {
    /// Creates a notifier that accepts every update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a notifier that rejects every update.
    #[must_use]
    pub fn rejecting() -> Self {
        Self {
            posted: Arc::default(),
            reject: true,
        }
    }

    /// Returns the updates accepted so far, oldest first.
    #[must_use]
    pub fn posted(&self) -> Vec<PostedUpdate> {
        self.posted
            .lock()
            .map(|posted| posted.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl UpdateNotifier for RecordingNotifier {
    async fn post_update(&self, channel: &str, text: &str) -> Result<(), NotifierError> {
        if self.reject {
            return Err(NotifierError::Rejected {
                channel: channel.to_owned(),
                reason: "notifier configured to reject".to_owned(),
            });
        }
        let mut posted = self
            .posted
            .lock()
            .map_err(|err| NotifierError::transport(std::io::Error::other(err.to_string())))?;
        posted.push(PostedUpdate {
            channel: channel.to_owned(),
            text: text.to_owned(),
        });
        Ok(())
    }
}
