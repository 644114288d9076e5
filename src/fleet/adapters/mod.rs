//! Adapter implementations for fleet checkout ports.

mod log_notifier;
pub mod memory;
pub mod postgres;

pub use log_notifier::LogNotifier;
