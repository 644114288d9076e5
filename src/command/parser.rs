//! Chat command parser.

use thiserror::Error;

/// A parsed chat command that needs fleet state to answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    /// `/checkout <truck> [days]`.
    Checkout {
        /// Truck name as typed.
        truck: String,
        /// Number of valid days, already bounded by the configured maximum.
        days: i64,
    },
    /// `/release <truck>`.
    Release {
        /// Truck name as typed.
        truck: String,
    },
    /// `/trucks available` or `/trucks checked-out`.
    Trucks {
        /// `true` for the checked-out listing.
        checked_out: bool,
    },
    /// `/team` shows the caller's team; `/team <team>` changes it.
    Team {
        /// Requested team, as typed.
        team: Option<String>,
    },
}

/// Input that is answered with a fixed hint instead of reaching the fleet.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandUsageError {
    /// `/checkout` without arguments.
    #[error("checkout requires a truck name")]
    CheckoutUsage,
    /// The day count is not a positive integer.
    #[error("invalid number of days '{0}'")]
    InvalidDays(String),
    /// The day count exceeds the configured maximum.
    #[error("{requested} days exceeds the {max}-day maximum")]
    TooManyDays {
        /// Requested day count.
        requested: i64,
        /// Configured maximum.
        max: u32,
    },
    /// `/checkout` with more than two arguments.
    #[error("too many arguments for checkout")]
    CheckoutTooManyArguments,
    /// `/release` without arguments.
    #[error("release requires a truck name")]
    ReleaseUsage,
    /// `/release` with more than one argument.
    #[error("too many arguments for release")]
    ReleaseTooManyArguments,
    /// `/trucks` without a recognised listing.
    #[error("trucks requires 'available' or 'checked-out'")]
    TrucksUsage,
    /// `/team` with more than one argument.
    #[error("too many arguments for team")]
    TeamTooManyArguments,
    /// The command is not handled here.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
}

impl CommandUsageError {
    /// Reply text shown to the caller.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::CheckoutUsage => "ℹ️ Use `/checkout [truck-name]` or `/checkout [truck-name] [days]` to check out a truck.".to_owned(),
            Self::InvalidDays(_) => {
                "⚠️ Invalid number of days. Use a positive integer like `/checkout Tulip 4`"
                    .to_owned()
            }
            Self::TooManyDays { max, .. } => format!("⚠️ Maximum checkout period is {max} days."),
            Self::CheckoutTooManyArguments => {
                "⚠️ Too many arguments. Try `/checkout Tulip`".to_owned()
            }
            Self::ReleaseUsage => "ℹ️ Use `/release [truck-name]` to release a truck.".to_owned(),
            Self::ReleaseTooManyArguments => "⚠️ Too many arguments. Try `/release Tulip`".to_owned(),
            Self::TrucksUsage => {
                "ℹ️ Try `/trucks available` to see today's available trucks.".to_owned()
            }
            Self::TeamTooManyArguments => "⚠️ Too many arguments. Try `/team beltline`".to_owned(),
            Self::UnknownCommand(_) => "Unknown command".to_owned(),
        }
    }
}

impl SlashCommand {
    /// Parses a command line such as `/checkout Tulip 4`.
    ///
    /// Arguments are whitespace separated. The command name is matched
    /// case-insensitively; argument values are passed through as typed.
    ///
    /// # Errors
    ///
    /// Returns [`CommandUsageError`] when the line should be answered with a
    /// usage hint.
    pub fn parse(input: &str, max_checkout_days: u32) -> Result<Self, CommandUsageError> {
        let mut tokens = input.split_whitespace();
        let command = tokens
            .next()
            .ok_or_else(|| CommandUsageError::UnknownCommand(String::new()))?;
        let args: Vec<&str> = tokens.collect();

        match command.to_ascii_lowercase().as_str() {
            "/checkout" => parse_checkout(&args, max_checkout_days),
            "/release" => parse_release(&args),
            "/trucks" => parse_trucks(&args),
            "/team" => parse_team(&args),
            _ => Err(CommandUsageError::UnknownCommand(command.to_owned())),
        }
    }
}

fn parse_checkout(args: &[&str], max_checkout_days: u32) -> Result<SlashCommand, CommandUsageError> {
    match args {
        [] => Err(CommandUsageError::CheckoutUsage),
        [truck] => Ok(SlashCommand::Checkout {
            truck: (*truck).to_owned(),
            days: 1,
        }),
        [truck, raw_days] => Ok(SlashCommand::Checkout {
            truck: (*truck).to_owned(),
            days: parse_days(raw_days, max_checkout_days)?,
        }),
        _ => Err(CommandUsageError::CheckoutTooManyArguments),
    }
}

fn parse_days(raw: &str, max_checkout_days: u32) -> Result<i64, CommandUsageError> {
    let requested = raw
        .parse::<i64>()
        .ok()
        .filter(|days| *days >= 1)
        .ok_or_else(|| CommandUsageError::InvalidDays(raw.to_owned()))?;
    if requested > i64::from(max_checkout_days) {
        return Err(CommandUsageError::TooManyDays {
            requested,
            max: max_checkout_days,
        });
    }
    Ok(requested)
}

fn parse_release(args: &[&str]) -> Result<SlashCommand, CommandUsageError> {
    match args {
        [] => Err(CommandUsageError::ReleaseUsage),
        [truck] => Ok(SlashCommand::Release {
            truck: (*truck).to_owned(),
        }),
        _ => Err(CommandUsageError::ReleaseTooManyArguments),
    }
}

fn parse_trucks(args: &[&str]) -> Result<SlashCommand, CommandUsageError> {
    match args.first().copied() {
        Some("available") => Ok(SlashCommand::Trucks { checked_out: false }),
        Some("checked-out") => Ok(SlashCommand::Trucks { checked_out: true }),
        _ => Err(CommandUsageError::TrucksUsage),
    }
}

fn parse_team(args: &[&str]) -> Result<SlashCommand, CommandUsageError> {
    match args {
        [] => Ok(SlashCommand::Team { team: None }),
        [team] => Ok(SlashCommand::Team {
            team: Some((*team).to_owned()),
        }),
        _ => Err(CommandUsageError::TeamTooManyArguments),
    }
}
