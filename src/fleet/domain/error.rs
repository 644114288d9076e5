//! Error types for fleet domain validation and parsing.

use super::{ReservationId, TruckName};
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// Errors returned while constructing or mutating fleet domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FleetDomainError {
    /// The truck name is not part of the fleet catalog.
    #[error("unknown truck name: {0}")]
    UnknownTruckName(String),

    /// The team name is not part of the team catalog.
    #[error("unknown team name: {0}")]
    UnknownTeamName(String),

    /// The chat-platform user identifier is empty after trimming.
    #[error("chat user identifier must not be empty")]
    EmptyChatUserId,

    /// The display name is empty after trimming.
    #[error("user name must not be empty")]
    EmptyUserName,

    /// The requested number of checkout days is not a positive integer.
    #[error("invalid checkout length {0}, expected a positive number of days")]
    InvalidCheckoutDays(i64),

    /// A reservation window ends before it starts.
    #[error("reservation window ends ({end}) before it starts ({start})")]
    InvalidWindow {
        /// Window start.
        start: DateTime<Utc>,
        /// Window end.
        end: DateTime<Utc>,
    },

    /// The computed window has already ended at the time of checkout.
    #[error("reservation window already ended at {0}")]
    WindowElapsed(DateTime<Utc>),

    /// A local wall-clock time does not exist on the given date (DST gap).
    #[error("local time {time} does not exist on {date}")]
    UnrepresentableLocalTime {
        /// Calendar date.
        date: NaiveDate,
        /// Wall-clock time that could not be resolved.
        time: chrono::NaiveTime,
    },

    /// The daily window closes before it opens.
    #[error("daily window closes at {end} before it opens at {start}")]
    InvalidDailyHours {
        /// Configured opening time.
        start: chrono::NaiveTime,
        /// Configured closing time.
        end: chrono::NaiveTime,
    },

    /// The valid-day set leaves no day to advance onto.
    #[error("no valid checkout days are configured")]
    NoValidDays,

    /// The truck is already flagged as checked out.
    #[error("truck {0} is already checked out")]
    TruckAlreadyCheckedOut(TruckName),

    /// The truck is not flagged as checked out.
    #[error("truck {0} is not checked out")]
    TruckNotCheckedOut(TruckName),

    /// The reservation already carries release audit fields.
    #[error("reservation {0} was already released")]
    ReservationAlreadyReleased(ReservationId),
}

/// Error returned while parsing weekday names from configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown weekday: {0}")]
pub struct ParseWeekdayError(pub String);
