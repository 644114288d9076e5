//! Notifier that writes channel updates to the structured log.

use async_trait::async_trait;
use tracing::info;

use crate::fleet::ports::{NotifierError, UpdateNotifier};

/// Emits each channel update as an `info` event.
///
/// Used when the service runs without a chat connection, for example from
/// the console runner or the sweep command.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl UpdateNotifier for LogNotifier {
    async fn post_update(&self, channel: &str, text: &str) -> Result<(), NotifierError> {
        info!(target: "truckbot::updates", channel, text, "channel update");
        Ok(())
    }
}
