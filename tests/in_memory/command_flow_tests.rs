//! Chat conversations through [`CommandService`].
//!
//! [`CommandService`]: truckbot::command::CommandService

use crate::in_memory::helpers::{FixedClock, local, provision_fleet, runtime, store};
use eyre::{WrapErr, eyre};
use rstest::rstest;
use std::{io, sync::Arc};
use tokio::runtime::Runtime;
use truckbot::{
    command::{CommandReply, CommandRequest, CommandService},
    fleet::{
        adapters::memory::{InMemoryFleetStore, RecordingNotifier},
        services::{CheckoutEngine, TruckRegistryService, UserDirectoryService},
    },
};

fn service(
    store: &Arc<InMemoryFleetStore>,
    notifier: &RecordingNotifier,
) -> CommandService<InMemoryFleetStore, RecordingNotifier, FixedClock> {
    let clock = Arc::new(FixedClock(local(2026, 10, 21, 9, 45)));
    CommandService::new(
        CheckoutEngine::new(
            Arc::clone(store),
            Arc::new(notifier.clone()),
            Arc::clone(&clock),
        )
        .with_channel("fleet-updates"),
        TruckRegistryService::new(Arc::clone(store)),
        UserDirectoryService::new(Arc::clone(store), clock),
    )
}

/// Tests a first-time user's conversation from team prompt to release.
#[rstest]
fn first_time_user_conversation(
    runtime: io::Result<Runtime>,
    store: Arc<InMemoryFleetStore>,
) -> eyre::Result<()> {
    let rt = runtime.wrap_err("runtime creation")?;
    rt.block_on(provision_fleet(&store))?;
    let notifier = RecordingNotifier::new();
    let chat = service(&store, &notifier);
    let say = |line: &str| {
        rt.block_on(chat.handle(CommandRequest::new("U042", "Rosa", line)))
            .wrap_err_with(|| format!("handling {line}"))
    };

    let CommandReply::SelectTeam(prompt) = say("/checkout watson 3")? else {
        return Err(eyre!("first checkout should prompt for a team"));
    };
    assert_eq!(
        prompt.text,
        "👋 Welcome! To checkout *Watson*, please select your team:"
    );

    let welcome = rt.block_on(chat.complete_team_selection(&prompt.metadata, "beltline"))?;
    assert_eq!(
        welcome.text(),
        "👋 Welcome! Created your profile with team beltline. ✅ Truck `Watson` checked out for 3 business days (Oct 21 7:00 AM - Oct 23, 2026 3:30 PM)!"
    );

    assert_eq!(
        say("/trucks checked-out")?.text(),
        "🔴 *Checked Out Trucks Today:*\n• Watson (beltline)\n"
    );
    assert_eq!(
        say("/checkout Tulip")?.text(),
        "✅ Truck `Tulip` checked out for today (7:00 AM - 3:30 PM)!"
    );
    assert_eq!(
        say("/release watson")?.text(),
        "✅ Truck `Watson` has been released successfully!"
    );
    assert_eq!(
        say("/trucks available")?.text(),
        "🟢 *Available Trucks Today:*\n• Libby (unassigned)\n• Watson (beltline)\n"
    );

    let posted = notifier.posted();
    assert_eq!(posted.len(), 3);
    assert!(posted.iter().all(|update| update.channel == "fleet-updates"));
    Ok(())
}

/// Tests that command mistakes never reach the fleet.
#[rstest]
fn usage_mistakes_leave_fleet_untouched(
    runtime: io::Result<Runtime>,
    store: Arc<InMemoryFleetStore>,
) -> eyre::Result<()> {
    let rt = runtime.wrap_err("runtime creation")?;
    rt.block_on(provision_fleet(&store))?;
    let notifier = RecordingNotifier::new();
    let chat = service(&store, &notifier);

    for (line, expected) in [
        ("/checkout", "ℹ️ Use `/checkout [truck-name]` or `/checkout [truck-name] [days]` to check out a truck."),
        ("/checkout Tulip 7", "⚠️ Maximum checkout period is 6 days."),
        ("/checkout Tulip 2 now", "⚠️ Too many arguments. Try `/checkout Tulip`"),
        ("/release", "ℹ️ Use `/release [truck-name]` to release a truck."),
        ("/trucks", "ℹ️ Try `/trucks available` to see today's available trucks."),
        ("/swap Tulip", "Unknown command"),
    ] {
        let reply = rt.block_on(chat.handle(CommandRequest::new("U042", "Rosa", line)))?;
        assert_eq!(reply.text(), expected, "reply to {line}");
    }

    assert!(notifier.posted().is_empty());
    let checked_out = rt.block_on(chat.engine().list_availability(true))?;
    assert!(checked_out.is_empty());
    Ok(())
}
