//! Row-locked checkout and release against `PostgreSQL`.

use crate::postgres::helpers::{
    engine_at, prepare_database, provision_fleet, requester, test_runtime, thursday_morning,
};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use std::sync::Arc;
use truckbot::fleet::{
    adapters::memory::RecordingNotifier,
    domain::{ChatUserId, TeamName, TruckName},
    services::{
        CheckoutError, CheckoutRequest, ReleaseRequest, ReservationLedgerService,
        TruckRegistryService,
    },
};

const RACERS: usize = 8;

/// Tests that concurrent checkouts of one truck admit exactly one winner.
#[rstest]
fn concurrent_checkouts_admit_exactly_one(shared_test_cluster: &'static TestCluster) {
    let rt = test_runtime().expect("runtime creation");
    let db = prepare_database(shared_test_cluster, "checkout_race").expect("database setup");
    rt.block_on(provision_fleet(&db.store)).expect("fleet");
    let notifier = RecordingNotifier::new();
    let engine = Arc::new(engine_at(&db.store, &notifier, thursday_morning()));

    let outcomes = rt.block_on(async {
        let handles: Vec<_> = (0..RACERS)
            .map(|racer| {
                let engine = Arc::clone(&engine);
                tokio::spawn(async move {
                    let user_id = format!("U{racer}");
                    engine
                        .checkout(CheckoutRequest::new(
                            "Watson",
                            requester(&user_id, "Racer", TeamName::Beltline),
                        ))
                        .await
                })
            })
            .collect();
        let mut outcomes = Vec::with_capacity(RACERS);
        for handle in handles {
            outcomes.push(handle.await.expect("checkout task"));
        }
        outcomes
    });

    let winners = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    let refused = outcomes
        .iter()
        .filter(|outcome| {
            matches!(
                outcome,
                Err(CheckoutError::AlreadyCheckedOut(TruckName::Watson))
            )
        })
        .count();
    assert_eq!(winners, 1, "outcomes: {outcomes:?}");
    assert_eq!(refused, RACERS - 1, "outcomes: {outcomes:?}");

    let history = rt
        .block_on(ReservationLedgerService::new(Arc::clone(&db.store)).history("Watson"))
        .expect("history");
    assert_eq!(history.len(), 1);
    let truck = rt
        .block_on(TruckRegistryService::new(Arc::clone(&db.store)).truck_by_name("Watson"))
        .expect("truck");
    assert!(truck.is_checked_out());
    assert_eq!(notifier.posted().len(), 1);
}

/// Tests that two concurrent releases close the reservation once.
#[rstest]
fn double_release_succeeds_once(shared_test_cluster: &'static TestCluster) {
    let rt = test_runtime().expect("runtime creation");
    let db = prepare_database(shared_test_cluster, "double_release").expect("database setup");
    rt.block_on(provision_fleet(&db.store)).expect("fleet");
    let notifier = RecordingNotifier::new();
    let engine = Arc::new(engine_at(&db.store, &notifier, thursday_morning()));
    let checkout = rt
        .block_on(engine.checkout(CheckoutRequest::new(
            "Tulip",
            requester("U1", "Dana", TeamName::UrbanTrees),
        )))
        .expect("checkout");

    let outcomes = rt.block_on(async {
        let releases = ["U1", "U2"].map(|user| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                engine
                    .release(ReleaseRequest::new(
                        "Tulip",
                        ChatUserId::new(user).expect("valid chat user id"),
                        user,
                    ))
                    .await
            })
        });
        let mut outcomes = Vec::with_capacity(releases.len());
        for handle in releases {
            outcomes.push(handle.await.expect("release task"));
        }
        outcomes
    });

    let released: Vec<_> = outcomes.iter().filter_map(|outcome| outcome.as_ref().ok()).collect();
    assert_eq!(released.len(), 1, "outcomes: {outcomes:?}");
    assert_eq!(
        released.first().map(|summary| summary.reservation_id),
        Some(checkout.reservation_id)
    );
    assert!(
        outcomes.iter().any(|outcome| matches!(
            outcome,
            Err(CheckoutError::NotCheckedOut(TruckName::Tulip))
        )),
        "outcomes: {outcomes:?}"
    );

    let history = rt
        .block_on(ReservationLedgerService::new(Arc::clone(&db.store)).history("Tulip"))
        .expect("history");
    let record = history
        .first()
        .and_then(|reservation| reservation.release_record())
        .expect("release recorded");
    assert_eq!(record.released_at(), thursday_morning());
    let truck = rt
        .block_on(TruckRegistryService::new(Arc::clone(&db.store)).truck_by_name("Tulip"))
        .expect("truck");
    assert!(!truck.is_checked_out());
}

/// Tests that the persisted reservation carries the requester and window.
#[rstest]
fn checkout_persists_requester_and_window(shared_test_cluster: &'static TestCluster) {
    let rt = test_runtime().expect("runtime creation");
    let db = prepare_database(shared_test_cluster, "checkout_audit").expect("database setup");
    rt.block_on(provision_fleet(&db.store)).expect("fleet");
    let notifier = RecordingNotifier::new();
    let engine = engine_at(&db.store, &notifier, thursday_morning());

    let checkout = rt
        .block_on(
            engine.checkout(
                CheckoutRequest::new("libby", requester("U7", "Rosa", TeamName::Floaters))
                    .with_days(3)
                    .with_purpose("Mulch run"),
            ),
        )
        .expect("checkout");

    let active = rt
        .block_on(
            ReservationLedgerService::new(Arc::clone(&db.store))
                .active_for_truck("Libby", thursday_morning()),
        )
        .expect("lookup")
        .expect("active reservation");
    assert_eq!(active.id(), checkout.reservation_id);
    assert_eq!(active.window(), checkout.window);
    assert_eq!(active.requester().user_name, "Rosa");
    assert_eq!(active.requester().team, TeamName::Floaters);
    assert_eq!(active.purpose(), Some("Mulch run"));
    assert!(!active.is_released());
}
