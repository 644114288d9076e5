//! Identifier and validated scalar types for the fleet domain.

use super::FleetDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the wrapped UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a provisioned truck.
    TruckId
);

uuid_id!(
    /// Unique identifier for a reservation (checkout) record.
    ReservationId
);

uuid_id!(
    /// Local identifier for a user profile.
    UserId
);

uuid_id!(
    /// Identifier correlating a truck with its external calendar.
    CalendarId
);

/// External chat-platform user identifier, e.g. `U024BE7LH`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatUserId(String);

impl ChatUserId {
    /// Creates a validated chat user identifier.
    ///
    /// # Errors
    ///
    /// Returns [`FleetDomainError::EmptyChatUserId`] when the value is empty
    /// after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, FleetDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FleetDomainError::EmptyChatUserId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Identity recorded when the service itself releases a lapsed
    /// reservation.
    #[must_use]
    pub fn system() -> Self {
        Self("system".to_owned())
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ChatUserId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ChatUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Positive number of valid days a checkout spans, counting today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckoutDays(u32);

impl CheckoutDays {
    /// A single-day checkout.
    pub const ONE: Self = Self(1);

    /// Creates a validated day count.
    ///
    /// # Errors
    ///
    /// Returns [`FleetDomainError::InvalidCheckoutDays`] when the value is
    /// zero or negative, or too large to represent.
    pub fn new(value: i64) -> Result<Self, FleetDomainError> {
        u32::try_from(value)
            .ok()
            .filter(|days| *days > 0)
            .map(Self)
            .ok_or(FleetDomainError::InvalidCheckoutDays(value))
    }

    /// Returns the underlying count.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CheckoutDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
