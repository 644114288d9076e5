//! Checkout, release and listing through [`CheckoutEngine`].
//!
//! [`CheckoutEngine`]: truckbot::fleet::services::CheckoutEngine

use crate::in_memory::helpers::{engine_at, local, provision_fleet, requester, runtime, store};
use rstest::rstest;
use std::{io, sync::Arc};
use tokio::runtime::Runtime;
use truckbot::fleet::{
    adapters::memory::{InMemoryFleetStore, RecordingNotifier},
    domain::{ChatUserId, CheckoutPolicy, TeamName, TruckName},
    services::{
        CheckoutError, CheckoutRequest, ReleaseRequest, ReservationLedgerService,
        TruckRegistryService,
    },
};

/// Tests the full available → checked out → available cycle and its audit
/// trail.
#[rstest]
fn checkout_release_cycle_leaves_audit_trail(
    runtime: io::Result<Runtime>,
    store: Arc<InMemoryFleetStore>,
) {
    let rt = runtime.expect("runtime creation");
    rt.block_on(provision_fleet(&store)).expect("fleet");
    let notifier = RecordingNotifier::new();
    let morning = engine_at(&store, &notifier, local(2026, 10, 19, 8, 15));

    let checkout = rt
        .block_on(morning.checkout(
            CheckoutRequest::new("watson", requester("U1", "Dana", TeamName::Beltline))
                .with_days(2)
                .with_purpose("Mulch delivery"),
        ))
        .expect("checkout");
    assert_eq!(checkout.window.end(), local(2026, 10, 20, 15, 30));

    let noon = engine_at(&store, &notifier, local(2026, 10, 20, 12, 0));
    let checked_out = rt.block_on(noon.list_availability(true)).expect("list");
    assert_eq!(
        checked_out.iter().map(|truck| truck.name).collect::<Vec<_>>(),
        vec![TruckName::Watson]
    );

    let released = rt
        .block_on(noon.release(ReleaseRequest::new(
            "Watson",
            ChatUserId::new("U2").expect("id"),
            "Sam",
        )))
        .expect("release");
    assert_eq!(released.previous_holder, "Dana");

    let history = rt
        .block_on(ReservationLedgerService::new(Arc::clone(&store)).history("Watson"))
        .expect("history");
    let entry = history.first().expect("one reservation");
    assert_eq!(entry.id(), checkout.reservation_id);
    assert_eq!(entry.purpose(), Some("Mulch delivery"));
    let record = entry.release_record().expect("released");
    assert_eq!(record.released_by().as_str(), "U2");
    assert_eq!(record.released_at(), local(2026, 10, 20, 12, 0));

    let texts: Vec<String> = notifier
        .posted()
        .into_iter()
        .map(|update| update.text)
        .collect();
    assert_eq!(
        texts,
        vec![
            "🚛 *Dana* checked out truck *Watson* (Oct 19 7:00 AM - Oct 20, 2026 3:30 PM)"
                .to_owned(),
            "🚛 *Sam* released truck *Watson* (previously checked out by Dana)".to_owned(),
        ]
    );
}

/// Tests that the flag and the ledger agree after every operation.
#[rstest]
fn flag_tracks_active_reservation(runtime: io::Result<Runtime>, store: Arc<InMemoryFleetStore>) {
    let rt = runtime.expect("runtime creation");
    rt.block_on(provision_fleet(&store)).expect("fleet");
    let notifier = RecordingNotifier::new();
    let now = local(2026, 10, 21, 9, 30);
    let engine = engine_at(&store, &notifier, now);
    let registry = TruckRegistryService::new(Arc::clone(&store));
    let ledger = ReservationLedgerService::new(Arc::clone(&store));

    let steps: [(&str, bool); 5] = [
        ("Tulip", true),
        ("Libby", true),
        ("Tulip", false),
        ("Tulip", true),
        ("Libby", false),
    ];
    for (truck, checkout) in steps {
        if checkout {
            rt.block_on(engine.checkout(CheckoutRequest::new(
                truck,
                requester("U1", "Dana", TeamName::UrbanTrees),
            )))
            .expect("checkout");
        } else {
            rt.block_on(engine.release(ReleaseRequest::new(
                truck,
                ChatUserId::new("U1").expect("id"),
                "Dana",
            )))
            .expect("release");
        }

        for stored in rt.block_on(registry.list_trucks()).expect("trucks") {
            let active = rt
                .block_on(ledger.active_for_truck(stored.name().as_str(), now))
                .expect("active lookup");
            assert_eq!(
                stored.is_checked_out(),
                active.is_some(),
                "flag and ledger disagree for {}",
                stored.name()
            );
        }
    }
}

/// Tests that the cross-team rule only applies when switched off.
#[rstest]
#[case(true)]
#[case(false)]
fn cross_team_rule_is_configurable(
    runtime: io::Result<Runtime>,
    store: Arc<InMemoryFleetStore>,
    #[case] allowed: bool,
) {
    let rt = runtime.expect("runtime creation");
    rt.block_on(provision_fleet(&store)).expect("fleet");
    let engine = engine_at(&store, &RecordingNotifier::new(), local(2026, 10, 21, 9, 30))
        .with_policy(CheckoutPolicy::default().with_cross_team_checkout(allowed));

    let own_team = rt.block_on(engine.checkout(CheckoutRequest::new(
        "Libby",
        requester("U1", "Dana", TeamName::Education),
    )));
    let other_team = rt.block_on(engine.checkout(CheckoutRequest::new(
        "Tulip",
        requester("U1", "Dana", TeamName::Education),
    )));

    assert!(own_team.is_ok(), "trucks without a team are open to everyone");
    assert_eq!(other_team.is_ok(), allowed);
    if !allowed {
        assert!(matches!(
            other_team,
            Err(CheckoutError::CrossTeamCheckout {
                truck: TruckName::Tulip,
                ..
            })
        ));
    }
}

/// Tests that an unprovisioned catalog name is reported as not found.
#[rstest]
fn unprovisioned_truck_is_not_found(runtime: io::Result<Runtime>, store: Arc<InMemoryFleetStore>) {
    let rt = runtime.expect("runtime creation");
    rt.block_on(provision_fleet(&store)).expect("fleet");
    let engine = engine_at(&store, &RecordingNotifier::new(), local(2026, 10, 21, 9, 30));

    let result = rt.block_on(engine.release(ReleaseRequest::new(
        "andre350",
        ChatUserId::new("U1").expect("id"),
        "Dana",
    )));

    assert!(matches!(result, Err(CheckoutError::TruckNotFound(name)) if name == "Andre350"));
}
