//! Reply text rendered with minijinja templates.

use chrono::Local;
use minijinja::{Environment, Value, context};

use super::CommandError;
use crate::fleet::{
    domain::{TeamName, TruckName},
    services::{CheckoutSummary, ReleaseSummary, TruckSummary},
};

/// Reply for store and infrastructure failures.
pub const GENERIC_FAILURE: &str = "❌ Something went wrong. Please try again.";
/// Reply when the team-selection metadata cannot be decoded.
pub const SELECTION_FAILURE: &str = "❌ Error processing team selection.";
/// Reply when a profile cannot be created.
pub const PROFILE_FAILURE: &str = "❌ Error creating user profile. Please try again.";
/// Reply for `/team` from a caller without a profile.
pub const NO_TEAM: &str = "ℹ️ You don't have a team yet. Set one with `/team beltline`.";

const TRUCK_LIST: &str =
    "{{ header }}\n{% for truck in trucks %}• {{ truck.name }} ({{ truck.team }})\n{% endfor %}";
const CHECKOUT_TODAY: &str =
    "✅ Truck `{{ truck }}` checked out for today ({{ opens }} - {{ closes }})!";
const CHECKOUT_DAYS: &str =
    "✅ Truck `{{ truck }}` checked out for {{ days }} business days ({{ range }})!";
const RELEASED: &str = "✅ Truck `{{ truck }}` has been released successfully!";
const TEAM_PROMPT: &str = "👋 Welcome! To checkout *{{ truck }}*, please select your team:";
const WELCOME: &str = "👋 Welcome! Created your profile with team {{ team }}. {{ reply }}";
const TEAM_CURRENT: &str = "👥 You are on team *{{ display }}* (`{{ team }}`).";
const TEAM_CHANGED: &str = "✅ Your team is now *{{ display }}* (`{{ team }}`).";
const UNKNOWN_TEAM: &str =
    "⚠️ Unknown team `{{ team }}`. Choose one of: {{ teams | join(\", \") }}";

/// Availability listing, or a fixed line when it is empty.
pub fn truck_list(trucks: &[TruckSummary], checked_out: bool) -> Result<String, CommandError> {
    if trucks.is_empty() {
        return Ok(if checked_out {
            "✅ All trucks are currently available!".to_owned()
        } else {
            "🚫 No trucks are currently available today.".to_owned()
        });
    }
    let header = if checked_out {
        "🔴 *Checked Out Trucks Today:*"
    } else {
        "🟢 *Available Trucks Today:*"
    };
    let rows: Vec<Value> = trucks
        .iter()
        .map(|truck| {
            context! {
                name => truck.name.as_str(),
                team => truck.default_team.map_or("unassigned", TeamName::as_str),
            }
        })
        .collect();
    render("truck_list", TRUCK_LIST, context! { header, trucks => rows })
}

/// Confirmation for a successful checkout.
pub fn checkout_success(summary: &CheckoutSummary) -> Result<String, CommandError> {
    if summary.days.value() == 1 {
        let opens = summary.window.start().with_timezone(&Local);
        let closes = summary.window.end().with_timezone(&Local);
        return render(
            "checkout_today",
            CHECKOUT_TODAY,
            context! {
                truck => summary.truck.as_str(),
                opens => opens.format("%-I:%M %p").to_string(),
                closes => closes.format("%-I:%M %p").to_string(),
            },
        );
    }
    render(
        "checkout_days",
        CHECKOUT_DAYS,
        context! {
            truck => summary.truck.as_str(),
            days => summary.days.value(),
            range => summary.range.as_str(),
        },
    )
}

/// Confirmation for a successful release.
pub fn release_success(summary: &ReleaseSummary) -> Result<String, CommandError> {
    render(
        "released",
        RELEASED,
        context! { truck => summary.truck.as_str() },
    )
}

/// Prompt shown to a first-time user before their checkout runs.
pub fn team_prompt(truck: TruckName) -> Result<String, CommandError> {
    render("team_prompt", TEAM_PROMPT, context! { truck => truck.as_str() })
}

/// Prefixes a checkout reply with the profile-creation greeting.
pub fn welcome(team: TeamName, reply: &str) -> Result<String, CommandError> {
    render(
        "welcome",
        WELCOME,
        context! { team => team.as_str(), reply },
    )
}

/// Current team of the caller.
pub fn team_current(team: TeamName) -> Result<String, CommandError> {
    render(
        "team_current",
        TEAM_CURRENT,
        context! { display => team.display_name(), team => team.as_str() },
    )
}

/// Confirmation of a team change.
pub fn team_changed(team: TeamName) -> Result<String, CommandError> {
    render(
        "team_changed",
        TEAM_CHANGED,
        context! { display => team.display_name(), team => team.as_str() },
    )
}

/// Rejection of a team outside the catalog.
pub fn unknown_team(raw: &str) -> Result<String, CommandError> {
    let teams: Vec<&str> = TeamName::ALL.iter().map(|team| team.as_str()).collect();
    render("unknown_team", UNKNOWN_TEAM, context! { team => raw, teams })
}

fn render(template: &'static str, source: &str, context: Value) -> Result<String, CommandError> {
    let environment = Environment::new();
    environment
        .render_str(source, context)
        .map_err(|error| CommandError::Render {
            template,
            reason: error.to_string(),
        })
}
