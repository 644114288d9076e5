//! Fixed catalog of truck and team names.
//!
//! The catalog is an allow-list gate, not a view of live inventory: adding a
//! truck means adding a variant here and provisioning a matching record.

use super::FleetDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a vehicle in the shared fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TruckName {
    /// Tulip.
    Tulip,
    /// Watson.
    Watson,
    /// Libby.
    Libby,
    /// Andre350.
    Andre350,
    /// Magnolia.
    Magnolia,
}

impl TruckName {
    /// Every catalogued truck, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Tulip,
        Self::Watson,
        Self::Libby,
        Self::Andre350,
        Self::Magnolia,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tulip => "Tulip",
            Self::Watson => "Watson",
            Self::Libby => "Libby",
            Self::Andre350 => "Andre350",
            Self::Magnolia => "Magnolia",
        }
    }

    /// Parses user input after title-casing it, so `tULIP` resolves to
    /// [`TruckName::Tulip`].
    ///
    /// # Errors
    ///
    /// Returns [`FleetDomainError::UnknownTruckName`] carrying the
    /// normalized input when it is not in the catalog.
    pub fn parse_normalized(raw: &str) -> Result<Self, FleetDomainError> {
        let normalized = title_case(raw.trim());
        Self::try_from(normalized.as_str())
    }
}

impl TryFrom<&str> for TruckName {
    type Error = FleetDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == value)
            .ok_or_else(|| FleetDomainError::UnknownTruckName(value.to_owned()))
    }
}

impl fmt::Display for TruckName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field team that can own or borrow trucks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamName {
    /// Urban trees crew.
    UrbanTrees,
    /// Beltline crew.
    Beltline,
    /// Neighborwoods crew.
    Neighborwoods,
    /// Forest restoration crew.
    ForestRestoration,
    /// Education programs.
    Education,
    /// Administration.
    Admin,
    /// Volunteer services.
    VolunteerServices,
    /// Workforce development.
    WorkforceDevelopment,
    /// Downtown planting crew.
    DowntownPlanting,
    /// Floating staff without a fixed crew.
    Floaters,
}

impl TeamName {
    /// Every catalogued team, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::UrbanTrees,
        Self::Beltline,
        Self::Neighborwoods,
        Self::ForestRestoration,
        Self::Education,
        Self::Admin,
        Self::VolunteerServices,
        Self::WorkforceDevelopment,
        Self::DowntownPlanting,
        Self::Floaters,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UrbanTrees => "urban_trees",
            Self::Beltline => "beltline",
            Self::Neighborwoods => "neighborwoods",
            Self::ForestRestoration => "forest_restoration",
            Self::Education => "education",
            Self::Admin => "admin",
            Self::VolunteerServices => "volunteer_services",
            Self::WorkforceDevelopment => "workforce_development",
            Self::DowntownPlanting => "downtown_planting",
            Self::Floaters => "floaters",
        }
    }

    /// Human-readable label, e.g. `Urban Trees`.
    #[must_use]
    pub fn display_name(self) -> String {
        self.as_str()
            .split('_')
            .map(title_case)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl TryFrom<&str> for TeamName {
    type Error = FleetDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|team| team.as_str() == value)
            .ok_or_else(|| FleetDomainError::UnknownTeamName(value.to_owned()))
    }
}

impl fmt::Display for TeamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns `true` iff `name` is exactly a catalogued truck name.
#[must_use]
pub fn is_valid_truck_name(name: &str) -> bool {
    TruckName::try_from(name).is_ok()
}

/// Returns `true` iff `name` is exactly a catalogued team name.
#[must_use]
pub fn is_valid_team_name(name: &str) -> bool {
    TeamName::try_from(name).is_ok()
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect()
    })
}
