//! Shared helpers for `PostgreSQL` fleet store tests.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::Clock;
use pg_embedded_setup_unpriv::TestCluster;
use std::{io, sync::Arc};
use tokio::runtime::Runtime;
use truckbot::fleet::{
    adapters::{memory::RecordingNotifier, postgres::PostgresFleetStore},
    domain::{ChatUserId, Requester, TeamName},
    services::{CheckoutEngine, CreateTruckRequest, TruckRegistryService},
};

/// Boxed error for test setup.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Engine wired to the `PostgreSQL` store and a recording notifier.
pub type PgEngine = CheckoutEngine<PostgresFleetStore, RecordingNotifier, FixedClock>;

/// SQL creating the fleet tables.
const CREATE_FLEET_TABLES: &str =
    include_str!("../../migrations/2026-10-01-000000_create_fleet_tables/up.sql");

/// Template database name for the pre-migrated schema.
const TEMPLATE_DB: &str = "truckbot_test_template";

/// Connections per test pool; enough for the race tests to overlap.
const POOL_SIZE: u32 = 12;

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Creates a tokio runtime for async operations in tests.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created.
pub fn test_runtime() -> io::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

/// Ensures the template database exists with the fleet schema applied.
///
/// # Errors
///
/// Returns an error if the template cannot be created or migrated.
pub fn ensure_template(cluster: &TestCluster) -> Result<(), BoxError> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            conn.batch_execute(CREATE_FLEET_TABLES)
                .map_err(|e| eyre::eyre!("SQL error: {e}"))?;
            Ok(())
        })
        .map_err(|e| Box::new(e) as BoxError)?;
    Ok(())
}

/// Drops the per-test database when it goes out of scope.
pub struct CleanupGuard {
    cluster: &'static TestCluster,
    db_name: String,
}

impl Drop for CleanupGuard {
    #[expect(
        clippy::print_stderr,
        reason = "Test cleanup warnings are informational"
    )]
    fn drop(&mut self) {
        if let Err(e) = self.cluster.drop_database(self.db_name.as_str()) {
            eprintln!("Warning: failed to drop test database {}: {e}", self.db_name);
        }
    }
}

/// A migrated database private to one test.
///
/// The store is declared before the guard so its pool closes before the
/// database is dropped.
pub struct FleetDatabase {
    /// Store over a pooled connection to the database.
    pub store: Arc<PostgresFleetStore>,
    /// Connection URL, for raw connections racing the store.
    pub url: String,
    _cleanup: CleanupGuard,
}

/// Creates a database from the template and opens a store over it.
///
/// # Errors
///
/// Returns an error if the template, database or pool cannot be set up.
pub fn prepare_database(
    cluster: &'static TestCluster,
    label: &str,
) -> Result<FleetDatabase, BoxError> {
    ensure_template(cluster)?;
    let db_name = format!("truckbot_{label}_{}", uuid::Uuid::new_v4().simple());
    cluster
        .create_database_from_template(db_name.as_str(), TEMPLATE_DB)
        .map_err(|e| Box::new(e) as BoxError)?;
    let cleanup = CleanupGuard {
        cluster,
        db_name: db_name.clone(),
    };
    let url = cluster.connection().database_url(&db_name);
    let pool = Pool::builder()
        .max_size(POOL_SIZE)
        .build(ConnectionManager::<PgConnection>::new(url.as_str()))?;
    Ok(FleetDatabase {
        store: Arc::new(PostgresFleetStore::new(pool)),
        url,
        _cleanup: cleanup,
    })
}

/// Provisions Tulip (`urban_trees`), Watson (`beltline`) and Libby (no team).
///
/// # Errors
///
/// Returns an error if provisioning fails.
pub async fn provision_fleet(store: &Arc<PostgresFleetStore>) -> Result<(), BoxError> {
    let registry = TruckRegistryService::new(Arc::clone(store));
    for request in [
        CreateTruckRequest::new("Tulip").with_default_team("urban_trees"),
        CreateTruckRequest::new("Watson").with_default_team("beltline"),
        CreateTruckRequest::new("Libby"),
    ] {
        registry.create_truck(request).await?;
    }
    Ok(())
}

/// Builds an engine whose clock reads `instant`.
#[must_use]
pub fn engine_at(
    store: &Arc<PostgresFleetStore>,
    notifier: &RecordingNotifier,
    instant: DateTime<Utc>,
) -> PgEngine {
    CheckoutEngine::new(
        Arc::clone(store),
        Arc::new(notifier.clone()),
        Arc::new(FixedClock(instant)),
    )
}

/// Thursday 22 October 2026, 10:00 local.
///
/// # Panics
///
/// Panics when the time does not exist locally.
#[must_use]
pub fn thursday_morning() -> DateTime<Utc> {
    local(2026, 10, 22, 10, 0)
}

/// Resolves a wall-clock time in the process time zone.
///
/// # Panics
///
/// Panics when the date or time does not exist locally.
#[must_use]
pub fn local(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .expect("valid calendar date and time");
    Local
        .from_local_datetime(&naive)
        .earliest()
        .expect("local time should exist")
        .with_timezone(&Utc)
}

/// Builds a requester.
///
/// # Panics
///
/// Panics when `user_id` is blank.
#[must_use]
pub fn requester(user_id: &str, user_name: &str, team: TeamName) -> Requester {
    Requester {
        user_id: ChatUserId::new(user_id).expect("valid chat user id"),
        user_name: user_name.to_owned(),
        team,
    }
}
