//! In-memory adapters for fleet checkout management.

mod notifier;
mod store;

pub use notifier::{PostedUpdate, RecordingNotifier};
pub use store::InMemoryFleetStore;
