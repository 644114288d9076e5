//! `PostgreSQL` adapters for fleet persistence.

mod models;
mod schema;
mod store;

pub use store::{FleetPgPool, PostgresFleetStore};
