//! Truckbot: shared-vehicle checkout for field teams.
//!
//! Field crews check trucks out and release them through chat commands.
//! The crate enforces one active reservation per truck, keeps a release
//! audit trail, and posts status updates to a shared channel.
//!
//! # Architecture
//!
//! Truckbot follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, channel updates)
//!
//! # Modules
//!
//! - [`fleet`]: Trucks, reservations, user profiles and the checkout engine
//! - [`command`]: Chat command parsing and replies
//! - [`config`]: Layered configuration
//! - [`telemetry`]: Tracing subscriber setup

pub mod command;
pub mod config;
pub mod fleet;
pub mod telemetry;
