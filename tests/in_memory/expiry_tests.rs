//! Lapsed checkouts and the expiry sweep.

use crate::in_memory::helpers::{engine_at, local, provision_fleet, requester, runtime, store};
use rstest::rstest;
use std::{io, sync::Arc};
use tokio::runtime::Runtime;
use truckbot::fleet::{
    adapters::memory::{InMemoryFleetStore, RecordingNotifier},
    domain::{ChatUserId, TeamName, TruckName},
    services::{CheckoutRequest, ReservationLedgerService},
};

/// Tests that a Friday checkout for two days runs over the weekend and
/// lapses on Monday afternoon.
#[rstest]
fn weekend_is_skipped_when_counting_days(
    runtime: io::Result<Runtime>,
    store: Arc<InMemoryFleetStore>,
) {
    let rt = runtime.expect("runtime creation");
    rt.block_on(provision_fleet(&store)).expect("fleet");
    let notifier = RecordingNotifier::new();

    let friday = engine_at(&store, &notifier, local(2026, 10, 23, 11, 0));
    let checkout = rt
        .block_on(friday.checkout(
            CheckoutRequest::new("Libby", requester("U1", "Dana", TeamName::Floaters))
                .with_days(2),
        ))
        .expect("checkout");
    assert_eq!(checkout.window.end(), local(2026, 10, 26, 15, 30));

    let saturday = engine_at(&store, &notifier, local(2026, 10, 24, 12, 0));
    assert!(
        rt.block_on(saturday.expire_lapsed())
            .expect("sweep")
            .is_empty()
    );

    let monday_evening = engine_at(&store, &notifier, local(2026, 10, 26, 16, 0));
    assert_eq!(
        rt.block_on(monday_evening.expire_lapsed()).expect("sweep"),
        vec![TruckName::Libby]
    );
}

/// Tests that listing releases lapsed checkouts before answering.
#[rstest]
fn listing_never_shows_a_lapsed_checkout(
    runtime: io::Result<Runtime>,
    store: Arc<InMemoryFleetStore>,
) {
    let rt = runtime.expect("runtime creation");
    rt.block_on(provision_fleet(&store)).expect("fleet");
    let notifier = RecordingNotifier::new();
    rt.block_on(
        engine_at(&store, &notifier, local(2026, 10, 21, 9, 0)).checkout(CheckoutRequest::new(
            "Tulip",
            requester("U1", "Dana", TeamName::UrbanTrees),
        )),
    )
    .expect("checkout");

    let next_morning = engine_at(&store, &notifier, local(2026, 10, 22, 8, 0));
    let checked_out = rt
        .block_on(next_morning.list_availability(true))
        .expect("list");
    let available = rt
        .block_on(next_morning.list_availability(false))
        .expect("list");

    assert!(checked_out.is_empty());
    assert_eq!(
        available.iter().map(|truck| truck.name).collect::<Vec<_>>(),
        vec![TruckName::Libby, TruckName::Tulip, TruckName::Watson]
    );
    let history = rt
        .block_on(ReservationLedgerService::new(Arc::clone(&store)).history("Tulip"))
        .expect("history");
    let record = history
        .first()
        .and_then(|entry| entry.release_record())
        .expect("expired reservation is stamped");
    assert_eq!(record.released_by(), &ChatUserId::system());
    assert_eq!(record.released_at(), local(2026, 10, 22, 8, 0));
}

/// Tests that the sweep leaves running checkouts alone.
#[rstest]
fn sweep_keeps_running_checkouts(runtime: io::Result<Runtime>, store: Arc<InMemoryFleetStore>) {
    let rt = runtime.expect("runtime creation");
    rt.block_on(provision_fleet(&store)).expect("fleet");
    let notifier = RecordingNotifier::new();
    let engine = engine_at(&store, &notifier, local(2026, 10, 21, 9, 0));
    rt.block_on(engine.checkout(CheckoutRequest::new(
        "Watson",
        requester("U1", "Dana", TeamName::Beltline),
    )))
    .expect("checkout");

    let afternoon = engine_at(&store, &notifier, local(2026, 10, 21, 15, 29));
    assert!(
        rt.block_on(afternoon.expire_lapsed())
            .expect("sweep")
            .is_empty()
    );
    let checked_out = rt
        .block_on(afternoon.list_availability(true))
        .expect("list");
    assert_eq!(checked_out.len(), 1);
}
