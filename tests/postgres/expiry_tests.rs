//! Lapse expiry on `PostgreSQL` while other transactions hold trucks.

use crate::postgres::helpers::{
    BoxError, engine_at, local, prepare_database, requester, test_runtime, thursday_morning,
};
use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Text, Timestamptz, Uuid as SqlUuid};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use std::{sync::Arc, sync::mpsc, thread, time::Duration as StdDuration};
use truckbot::fleet::{
    adapters::memory::RecordingNotifier,
    domain::{ChatUserId, Reservation, ReservationWindow, TeamName, TruckName},
    services::{
        CreateTruckRequest, ReleaseRequest, ReservationLedgerService, TruckRegistryService,
    },
};
use uuid::Uuid;

/// How long the competing checkout keeps its row lock after signalling.
const HOLD: StdDuration = StdDuration::from_millis(1500);

/// Checks a truck out over a raw connection, the way a second bot process
/// would: lock the row, set the flag, record a reservation around `now`,
/// then hold the lock for [`HOLD`] before committing.
fn hold_checkout(
    url: &str,
    truck_id: Uuid,
    now: DateTime<Utc>,
    locked: &mpsc::Sender<()>,
) -> Result<Uuid, BoxError> {
    let mut conn = PgConnection::establish(url)?;
    let reservation_id = Uuid::new_v4();
    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::sql_query("SELECT id FROM trucks WHERE id = $1 FOR UPDATE")
            .bind::<SqlUuid, _>(truck_id)
            .execute(conn)?;
        diesel::sql_query("UPDATE trucks SET is_checked_out = TRUE WHERE id = $1")
            .bind::<SqlUuid, _>(truck_id)
            .execute(conn)?;
        diesel::sql_query(concat!(
            "INSERT INTO checkouts ",
            "(id, truck_id, user_id, user_name, team_name, start_date, end_date) ",
            "VALUES ($1, $2, $3, $4, $5, $6, $7)",
        ))
        .bind::<SqlUuid, _>(reservation_id)
        .bind::<SqlUuid, _>(truck_id)
        .bind::<Text, _>("U5")
        .bind::<Text, _>("Jules")
        .bind::<Text, _>("beltline")
        .bind::<Timestamptz, _>(now - Duration::hours(3))
        .bind::<Timestamptz, _>(now + Duration::hours(5))
        .execute(conn)?;
        if locked.send(()).is_err() {
            return Err(diesel::result::Error::RollbackTransaction);
        }
        thread::sleep(HOLD);
        Ok(())
    })?;
    Ok(reservation_id)
}

/// Tests that a sweep waits on a checkout holding the truck lock and keeps
/// the reservation it commits.
///
/// Watson starts with a stale flag and no reservation, so an unlocked sweep
/// would decide to release it and then overwrite the committed checkout.
#[rstest]
fn sweep_respects_a_checkout_committing_concurrently(
    shared_test_cluster: &'static TestCluster,
) {
    let rt = test_runtime().expect("runtime creation");
    let db = prepare_database(shared_test_cluster, "sweep_race").expect("database setup");
    let registry = TruckRegistryService::new(Arc::clone(&db.store));
    let watson = rt
        .block_on(registry.create_truck(CreateTruckRequest::new("Watson").with_checked_out(true)))
        .expect("truck");
    let now = thursday_morning();

    let (locked_tx, locked_rx) = mpsc::channel();
    let url = db.url.clone();
    let truck_id = watson.id().into_inner();
    let holder = thread::spawn(move || hold_checkout(&url, truck_id, now, &locked_tx));
    locked_rx.recv().expect("competing checkout holds the lock");

    let notifier = RecordingNotifier::new();
    let engine = engine_at(&db.store, &notifier, now);
    let expired = rt.block_on(engine.expire_lapsed()).expect("sweep");
    let reservation_id = holder
        .join()
        .expect("holder thread")
        .expect("competing checkout");

    assert!(expired.is_empty(), "sweep expired {expired:?}");
    let truck = rt
        .block_on(registry.truck_by_name("Watson"))
        .expect("truck");
    assert!(truck.is_checked_out());
    let active = rt
        .block_on(
            ReservationLedgerService::new(Arc::clone(&db.store)).active_for_truck("Watson", now),
        )
        .expect("lookup")
        .expect("reservation stays active");
    assert_eq!(active.id().into_inner(), reservation_id);
    let checked_out = rt
        .block_on(engine.list_availability(true))
        .expect("checked out");
    assert_eq!(
        checked_out.iter().map(|truck| truck.name).collect::<Vec<_>>(),
        vec![TruckName::Watson]
    );
    let released = rt
        .block_on(engine.release(ReleaseRequest::new(
            "Watson",
            ChatUserId::new("U5").expect("valid chat user id"),
            "Jules",
        )))
        .expect("holder releases");
    assert_eq!(released.previous_holder, "Jules");
}

/// Tests that overlapping sweeps release a lapsed checkout exactly once.
#[rstest]
fn overlapping_sweeps_release_once(shared_test_cluster: &'static TestCluster) {
    let rt = test_runtime().expect("runtime creation");
    let db = prepare_database(shared_test_cluster, "sweep_overlap").expect("database setup");
    let registry = TruckRegistryService::new(Arc::clone(&db.store));
    let ledger = ReservationLedgerService::new(Arc::clone(&db.store));
    let tulip = rt
        .block_on(registry.create_truck(CreateTruckRequest::new("Tulip").with_checked_out(true)))
        .expect("truck");
    let yesterday = ReservationWindow::new(local(2026, 10, 21, 7, 0), local(2026, 10, 21, 15, 30))
        .expect("window");
    rt.block_on(ledger.insert_reservation(Reservation::new(
        tulip.id(),
        requester("U1", "Dana", TeamName::UrbanTrees),
        yesterday,
        None,
        local(2026, 10, 21, 7, 0),
    )))
    .expect("lapsed reservation");
    let notifier = RecordingNotifier::new();
    let engine = Arc::new(engine_at(&db.store, &notifier, thursday_morning()));

    let sweeps = rt.block_on(async {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                tokio::spawn(async move { engine.expire_lapsed().await })
            })
            .collect();
        let mut sweeps = Vec::with_capacity(handles.len());
        for handle in handles {
            sweeps.push(handle.await.expect("sweep task").expect("sweep"));
        }
        sweeps
    });

    let released: usize = sweeps.iter().map(Vec::len).sum();
    assert_eq!(released, 1, "sweeps: {sweeps:?}");
    assert!(sweeps.iter().flatten().all(|name| *name == TruckName::Tulip));
    let history = rt.block_on(ledger.history("Tulip")).expect("history");
    assert_eq!(history.len(), 1);
    assert!(history.iter().all(|reservation| reservation.is_released()));
}
