//! Channel updates announcing fleet state changes.

use super::{ReservationWindow, TruckName};
use chrono::TimeZone;
use std::fmt;

/// A state change worth announcing on the shared updates channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FleetNotice {
    /// A truck was checked out.
    CheckedOut {
        /// Display name of the requester.
        user_name: String,
        /// Truck that was checked out.
        truck: TruckName,
        /// Reserved window.
        window: ReservationWindow,
    },
    /// A truck was released.
    Released {
        /// Display name of the releaser.
        released_by: String,
        /// Truck that was released.
        truck: TruckName,
        /// Display name of the previous holder, when known.
        previous_holder: Option<String>,
    },
}

impl FleetNotice {
    /// Renders the notice as channel text, formatting dates in `zone`.
    #[must_use]
    pub fn render<Tz>(&self, zone: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        match self {
            Self::CheckedOut {
                user_name,
                truck,
                window,
            } => format!(
                "🚛 *{user_name}* checked out truck *{truck}* ({})",
                window.describe(zone)
            ),
            Self::Released {
                released_by,
                truck,
                previous_holder: Some(holder),
            } => format!(
                "🚛 *{released_by}* released truck *{truck}* (previously checked out by {holder})"
            ),
            Self::Released {
                released_by,
                truck,
                previous_holder: None,
            } => format!("🚛 *{released_by}* released truck *{truck}*"),
        }
    }
}
