//! Shared-truck checkout management.
//!
//! Field teams check trucks out for a number of valid days and release them
//! early when done. Each truck holds at most one active reservation, and its
//! checked-out flag always moves together with the ledger. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
