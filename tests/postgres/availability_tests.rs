//! Listings over `PostgreSQL` require the flag and the ledger to agree.

use crate::postgres::helpers::{
    engine_at, local, prepare_database, requester, test_runtime, thursday_morning,
};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use std::sync::Arc;
use truckbot::fleet::{
    adapters::memory::RecordingNotifier,
    domain::{Reservation, ReservationWindow, TeamName, Truck, TruckName},
    services::{
        CheckoutRequest, CreateTruckRequest, ReservationLedgerService, TruckRegistryService,
    },
};

/// Tests the four flag and ledger combinations before and after a sweep.
///
/// Tulip is flagged with no reservation, Watson carries a reservation
/// without the flag, Magnolia is flagged and booked, and Libby is idle.
#[rstest]
fn stale_flag_is_listed_nowhere_until_swept(shared_test_cluster: &'static TestCluster) {
    let rt = test_runtime().expect("runtime creation");
    let db = prepare_database(shared_test_cluster, "availability").expect("database setup");
    let registry = TruckRegistryService::new(Arc::clone(&db.store));
    let ledger = ReservationLedgerService::new(Arc::clone(&db.store));
    let now = thursday_morning();
    let today = ReservationWindow::new(local(2026, 10, 22, 7, 0), local(2026, 10, 22, 15, 30))
        .expect("window");

    rt.block_on(async {
        registry
            .create_truck(CreateTruckRequest::new("Tulip").with_checked_out(true))
            .await?;
        let watson = registry.create_truck(CreateTruckRequest::new("Watson")).await?;
        let magnolia = registry
            .create_truck(CreateTruckRequest::new("Magnolia").with_checked_out(true))
            .await?;
        registry.create_truck(CreateTruckRequest::new("Libby")).await?;
        for truck in [watson, magnolia] {
            ledger
                .insert_reservation(Reservation::new(
                    truck.id(),
                    requester("U1", "Dana", TeamName::Beltline),
                    today,
                    None,
                    now,
                ))
                .await?;
        }
        Ok::<_, eyre::Report>(())
    })
    .expect("fleet");

    let names = |trucks: Vec<Truck>| {
        trucks.iter().map(|truck| truck.name()).collect::<Vec<_>>()
    };
    let available = rt
        .block_on(registry.list_by_availability(now, false))
        .expect("available");
    let checked_out = rt
        .block_on(registry.list_by_availability(now, true))
        .expect("checked out");
    assert_eq!(names(available), vec![TruckName::Libby]);
    assert_eq!(names(checked_out), vec![TruckName::Magnolia]);

    let notifier = RecordingNotifier::new();
    let engine = engine_at(&db.store, &notifier, now);
    assert_eq!(
        rt.block_on(engine.expire_lapsed()).expect("sweep"),
        vec![TruckName::Tulip]
    );
    let listed = rt
        .block_on(engine.list_availability(false))
        .expect("available");
    assert_eq!(
        listed.iter().map(|truck| truck.name).collect::<Vec<_>>(),
        vec![TruckName::Libby, TruckName::Tulip]
    );
}

/// Tests that the listing sweep releases a lapsed checkout on `PostgreSQL`.
#[rstest]
fn listing_releases_lapsed_checkouts(shared_test_cluster: &'static TestCluster) {
    let rt = test_runtime().expect("runtime creation");
    let db = prepare_database(shared_test_cluster, "lapsed_listing").expect("database setup");
    let registry = TruckRegistryService::new(Arc::clone(&db.store));
    rt.block_on(registry.create_truck(CreateTruckRequest::new("Tulip")))
        .expect("truck");
    let notifier = RecordingNotifier::new();
    rt.block_on(
        engine_at(&db.store, &notifier, local(2026, 10, 21, 9, 0)).checkout(
            CheckoutRequest::new("Tulip", requester("U1", "Dana", TeamName::UrbanTrees)),
        ),
    )
    .expect("checkout");

    let engine = engine_at(&db.store, &notifier, thursday_morning());
    let checked_out = rt
        .block_on(engine.list_availability(true))
        .expect("checked out");

    assert!(checked_out.is_empty());
    let history = rt
        .block_on(ReservationLedgerService::new(Arc::clone(&db.store)).history("Tulip"))
        .expect("history");
    let record = history
        .first()
        .and_then(|reservation| reservation.release_record())
        .expect("release recorded");
    assert_eq!(record.released_by().as_str(), "system");
}
