//! Checkout policy: daily hours, valid days and team rules.

use super::{FleetDomainError, ParseWeekdayError};
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Set of weekdays a multi-day checkout may land on.
///
/// Deployments disagree on whether Saturday counts, so the set is
/// configuration rather than a constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ValidDays(Vec<Weekday>);

impl ValidDays {
    /// Monday through Friday.
    #[must_use]
    pub fn weekdays() -> Self {
        Self(vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ])
    }

    /// Monday through Saturday.
    #[must_use]
    pub fn weekdays_and_saturday() -> Self {
        let mut days = Self::weekdays();
        days.0.push(Weekday::Sat);
        days
    }

    /// Builds a set from explicit weekdays, dropping duplicates.
    #[must_use]
    pub fn from_days(days: impl IntoIterator<Item = Weekday>) -> Self {
        let mut unique: Vec<Weekday> = Vec::new();
        for day in days {
            if !unique.contains(&day) {
                unique.push(day);
            }
        }
        Self(unique)
    }

    /// Returns `true` when `date` falls on a valid day.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.0.contains(&date.weekday())
    }

    /// Returns `true` when no day is valid.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the valid weekdays.
    #[must_use]
    pub fn days(&self) -> &[Weekday] {
        &self.0
    }
}

impl Default for ValidDays {
    fn default() -> Self {
        Self::weekdays()
    }
}

impl TryFrom<Vec<String>> for ValidDays {
    type Error = ParseWeekdayError;

    fn try_from(values: Vec<String>) -> Result<Self, Self::Error> {
        let days = values
            .iter()
            .map(|value| parse_weekday(value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_days(days))
    }
}

impl From<ValidDays> for Vec<String> {
    fn from(days: ValidDays) -> Self {
        days.0.iter().map(ToString::to_string).collect()
    }
}

fn parse_weekday(value: &str) -> Result<Weekday, ParseWeekdayError> {
    let normalized = value.trim().to_ascii_lowercase();
    let day = match normalized.as_str() {
        "mon" | "monday" => Weekday::Mon,
        "tue" | "tues" | "tuesday" => Weekday::Tue,
        "wed" | "wednesday" => Weekday::Wed,
        "thu" | "thurs" | "thursday" => Weekday::Thu,
        "fri" | "friday" => Weekday::Fri,
        "sat" | "saturday" => Weekday::Sat,
        "sun" | "sunday" => Weekday::Sun,
        _ => return Err(ParseWeekdayError(value.to_owned())),
    };
    Ok(day)
}

/// Rules the checkout engine applies when computing and admitting
/// reservations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutPolicy {
    /// Whether a requester may check out a truck whose default team differs
    /// from their own.
    pub allow_cross_team_checkout: bool,
    /// Days a multi-day checkout may span.
    pub valid_days: ValidDays,
    /// Local time a reservation window opens.
    pub day_start: NaiveTime,
    /// Local time a reservation window closes on its last day.
    pub day_end: NaiveTime,
    /// Longest checkout the command surface accepts.
    pub max_checkout_days: u32,
}

impl CheckoutPolicy {
    /// Validates internal consistency of the policy.
    ///
    /// # Errors
    ///
    /// Returns [`FleetDomainError::NoValidDays`] when the valid-day set is
    /// empty, [`FleetDomainError::InvalidDailyHours`] when the window closes
    /// before it opens, or [`FleetDomainError::InvalidCheckoutDays`] when the
    /// maximum is zero.
    pub fn validate(&self) -> Result<(), FleetDomainError> {
        if self.valid_days.is_empty() {
            return Err(FleetDomainError::NoValidDays);
        }
        if self.day_start >= self.day_end {
            return Err(FleetDomainError::InvalidDailyHours {
                start: self.day_start,
                end: self.day_end,
            });
        }
        if self.max_checkout_days == 0 {
            return Err(FleetDomainError::InvalidCheckoutDays(0));
        }
        Ok(())
    }

    /// Sets the cross-team checkout rule.
    #[must_use]
    pub const fn with_cross_team_checkout(mut self, allowed: bool) -> Self {
        self.allow_cross_team_checkout = allowed;
        self
    }

    /// Sets the valid-day set.
    #[must_use]
    pub fn with_valid_days(mut self, valid_days: ValidDays) -> Self {
        self.valid_days = valid_days;
        self
    }
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        Self {
            allow_cross_team_checkout: true,
            valid_days: ValidDays::default(),
            day_start: NaiveTime::from_hms_opt(7, 0, 0).unwrap_or(NaiveTime::MIN),
            day_end: NaiveTime::from_hms_opt(15, 30, 0).unwrap_or(NaiveTime::MIN),
            max_checkout_days: 6,
        }
    }
}
