//! Layered service configuration.
//!
//! Values come from built-in defaults, then `truckbot.toml` (or an explicit
//! file), then `TRUCKBOT__`-prefixed environment variables using `__` as the
//! nesting separator, e.g. `TRUCKBOT__CHECKOUT__MAX_CHECKOUT_DAYS=5`.

use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fleet::{
    domain::{CheckoutPolicy, FleetDomainError},
    services::DEFAULT_UPDATES_CHANNEL,
};

const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum FleetConfigError {
    /// A source could not be read or deserialised.
    #[error(transparent)]
    Source(#[from] config::ConfigError),
    /// The checkout policy is inconsistent.
    #[error("invalid checkout policy: {0}")]
    Policy(#[from] FleetDomainError),
    /// The updates channel is blank.
    #[error("notifications.channel must not be empty")]
    EmptyChannel,
    /// The expiry sweep would never run.
    #[error("sweep_interval_secs must be positive")]
    ZeroSweepInterval,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Multi-line, human-oriented output.
    Pretty,
    /// Single-line, human-oriented output.
    #[default]
    Compact,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `info` or
    /// `truckbot=debug`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::default(),
        }
    }
}

/// Channel update settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Channel that receives checkout and release updates.
    pub channel: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            channel: DEFAULT_UPDATES_CHANNEL.to_owned(),
        }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// `PostgreSQL` connection URL. The in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Checkout rules.
    pub checkout: CheckoutPolicy,
    /// Channel update settings.
    pub notifications: NotificationConfig,
    /// Seconds between expiry sweeps.
    pub sweep_interval_secs: u64,
    /// Logging settings.
    pub log: LogConfig,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            checkout: CheckoutPolicy::default(),
            notifications: NotificationConfig::default(),
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            log: LogConfig::default(),
        }
    }
}

impl FleetConfig {
    /// Loads and validates configuration.
    ///
    /// `path` must exist when given; otherwise `truckbot.toml` in the working
    /// directory is read if present.
    ///
    /// # Errors
    ///
    /// Returns [`FleetConfigError`] when a source is unreadable, a value does
    /// not deserialise, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, FleetConfigError> {
        let file = path.map_or_else(
            || File::with_name("truckbot").required(false),
            |explicit| File::from(explicit).required(true),
        );
        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("TRUCKBOT")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("checkout.valid_days")
                    .try_parsing(true),
            )
            .build()?;
        let loaded: Self = settings.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Parses configuration from TOML text and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`FleetConfigError`] when the text does not deserialise or
    /// validation fails.
    pub fn from_toml(text: &str) -> Result<Self, FleetConfigError> {
        let settings = Config::builder()
            .add_source(File::from_str(text, config::FileFormat::Toml))
            .build()?;
        let parsed: Self = settings.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Checks cross-field consistency.
    ///
    /// # Errors
    ///
    /// Returns [`FleetConfigError::Policy`] for an empty valid-day set, a
    /// daily window that closes before it opens, or a zero maximum;
    /// [`FleetConfigError::EmptyChannel`] and
    /// [`FleetConfigError::ZeroSweepInterval`] otherwise.
    pub fn validate(&self) -> Result<(), FleetConfigError> {
        self.checkout.validate()?;
        if self.notifications.channel.trim().is_empty() {
            return Err(FleetConfigError::EmptyChannel);
        }
        if self.sweep_interval_secs == 0 {
            return Err(FleetConfigError::ZeroSweepInterval);
        }
        Ok(())
    }
}
