//! Reservation windows and the business-day arithmetic behind them.

use super::{CheckoutDays, CheckoutPolicy, FleetDomainError, ValidDays};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open reservation interval `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ReservationWindow {
    /// Creates a window from explicit bounds.
    ///
    /// # Errors
    ///
    /// Returns [`FleetDomainError::InvalidWindow`] when `end` precedes
    /// `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, FleetDomainError> {
        if end < start {
            return Err(FleetDomainError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Computes the window for a checkout issued at `now`.
    ///
    /// The window opens today at the policy's opening time and closes on the
    /// `days`-th valid day (today counts as the first) at the closing time,
    /// both in `now`'s time zone.
    ///
    /// Two cases deliberately depart from a fixed opening-time start, so
    /// that every committed checkout is active at commit time:
    ///
    /// - a checkout issued before opening time starts at `now`, not at the
    ///   opening time later that day;
    /// - a window that has already closed when computed (a one-day checkout
    ///   after closing time) is refused instead of being recorded as over.
    ///
    /// # Errors
    ///
    /// Returns [`FleetDomainError::WindowElapsed`] when the computed window
    /// has already closed, [`FleetDomainError::NoValidDays`] when a multi-day
    /// checkout has no valid day to land on, or
    /// [`FleetDomainError::UnrepresentableLocalTime`] when a bound falls in a
    /// daylight-saving gap.
    pub fn for_checkout<Tz: TimeZone>(
        now: &DateTime<Tz>,
        days: CheckoutDays,
        policy: &CheckoutPolicy,
    ) -> Result<Self, FleetDomainError> {
        let zone = now.timezone();
        let today = now.date_naive();
        let last_day = last_valid_day(today, days, &policy.valid_days)?;
        let opening = resolve_local(&zone, today, policy.day_start)?;
        let closing = resolve_local(&zone, last_day, policy.day_end)?;

        let now_utc = now.with_timezone(&Utc);
        let start = opening.min(now_utc);
        if closing <= now_utc {
            return Err(FleetDomainError::WindowElapsed(closing));
        }
        Self::new(start, closing)
    }

    /// Returns the window start.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the (exclusive) window end.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns `true` when `start <= instant < end`.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Returns `true` once the window has closed at `instant`.
    #[must_use]
    pub fn has_ended_by(&self, instant: DateTime<Utc>) -> bool {
        self.end <= instant
    }

    /// Formats the window for chat messages in the given time zone, e.g.
    /// `Oct 15, 2026 (7:00 AM - 3:30 PM)` or
    /// `Oct 15 7:00 AM - Oct 20, 2026 3:30 PM`.
    #[must_use]
    pub fn describe<Tz>(&self, zone: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let start = self.start.with_timezone(zone);
        let end = self.end.with_timezone(zone);
        if start.date_naive() == end.date_naive() {
            format!(
                "{} ({} - {})",
                start.format("%b %-d, %Y"),
                start.format("%-I:%M %p"),
                end.format("%-I:%M %p"),
            )
        } else {
            format!(
                "{} {} - {} {}",
                start.format("%b %-d"),
                start.format("%-I:%M %p"),
                end.format("%b %-d, %Y"),
                end.format("%-I:%M %p"),
            )
        }
    }
}

/// Returns the date of the `days`-th valid day, counting `today` as the
/// first whatever its weekday.
///
/// # Errors
///
/// Returns [`FleetDomainError::NoValidDays`] when more than one day is
/// requested but no weekday is valid.
pub fn last_valid_day(
    today: NaiveDate,
    days: CheckoutDays,
    valid_days: &ValidDays,
) -> Result<NaiveDate, FleetDomainError> {
    let mut remaining = days.value().saturating_sub(1);
    if remaining > 0 && valid_days.is_empty() {
        return Err(FleetDomainError::NoValidDays);
    }

    let mut current = today;
    while remaining > 0 {
        current = current.succ_opt().ok_or(FleetDomainError::NoValidDays)?;
        if valid_days.contains(current) {
            remaining -= 1;
        }
    }
    Ok(current)
}

fn resolve_local<Tz: TimeZone>(
    zone: &Tz,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<DateTime<Utc>, FleetDomainError> {
    zone.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or(FleetDomainError::UnrepresentableLocalTime { date, time })
}
