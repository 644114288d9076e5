//! Chat command surface for the truck fleet.
//!
//! Parses `/checkout`, `/release`, `/trucks` and `/team` command lines,
//! resolves the caller's team, drives the checkout engine and renders reply
//! text. The chat transport itself lives outside this crate.

mod parser;
pub mod replies;
mod service;

pub use parser::{CommandUsageError, SlashCommand};
pub use service::{
    CommandReply, CommandRequest, CommandResult, CommandService, PendingCheckout, TeamOption,
    TeamPrompt,
};

use thiserror::Error;

/// Failures that prevent a reply from being produced.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A reply template failed to render.
    #[error("reply template '{template}' failed to render: {reason}")]
    Render {
        /// Template identifier.
        template: &'static str,
        /// Rendering failure reason.
        reason: String,
    },
    /// Pending-checkout metadata could not be encoded or decoded.
    #[error("pending checkout metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests;
