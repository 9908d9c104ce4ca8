//! Runtime configuration, read from `PAYWATCH_*` environment variables.
//!
//! Missing or malformed values fall back to the defaults with a log message; nothing here panics. Call
//! [`WatcherConfig::validate`] before starting to reject settings that cannot work.
use std::{env, fmt::Display, str::FromStr, time::Duration as StdDuration};

use chrono::Duration;
use log::*;
use paywatch_common::helpers::parse_boolean_flag;
use thiserror::Error;

use crate::{carrier::DEFAULT_CARRIER_TIMEOUT_SECS, watcher_api::DEFAULT_MAX_CONFIRMATIONS};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/paywatch.db";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
/// No block below this height is ever processed unless overridden.
pub const DEFAULT_GENESIS_BLOCK: i64 = 314_170;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PAYWATCH_DATABASE_URL is empty")]
    MissingDatabaseUrl,
    #[error("Max confirmations must be at least 1, got {0}")]
    InvalidMaxConfirmations(i64),
    #[error("Genesis block cannot be negative, got {0}")]
    InvalidGenesisBlock(i64),
    #[error("Carrier timeout must be positive, got {0} seconds")]
    InvalidCarrierTimeout(i64),
    #[error("Poll interval cannot be zero")]
    InvalidPollInterval,
}

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub genesis_block: i64,
    /// How many confirmation levels are delivered for each transaction.
    pub max_confirmations: i64,
    /// How long a carrier-shaped native transaction waits for its token-layer counterpart.
    pub carrier_timeout: Duration,
    /// Time between orchestrator iterations in [`crate::run_watcher`].
    pub poll_interval: StdDuration,
    /// Bring the schema up to date on startup.
    pub run_migrations: bool,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            genesis_block: DEFAULT_GENESIS_BLOCK,
            max_confirmations: DEFAULT_MAX_CONFIRMATIONS,
            carrier_timeout: Duration::seconds(DEFAULT_CARRIER_TIMEOUT_SECS),
            poll_interval: StdDuration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            run_migrations: true,
        }
    }
}

impl WatcherConfig {
    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key-value source. `lookup` returns `None` for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Self
    where F: Fn(&str) -> Option<String> {
        let database_url = lookup("PAYWATCH_DATABASE_URL").unwrap_or_else(|| {
            info!("🪛️ PAYWATCH_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });
        let db_max_connections =
            parse_or_default(&lookup, "PAYWATCH_DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS);
        let genesis_block = parse_or_default(&lookup, "PAYWATCH_GENESIS_BLOCK", DEFAULT_GENESIS_BLOCK);
        let max_confirmations = parse_or_default(&lookup, "PAYWATCH_MAX_CONFIRMATIONS", DEFAULT_MAX_CONFIRMATIONS);
        let timeout_secs = parse_or_default(&lookup, "PAYWATCH_CARRIER_TIMEOUT", DEFAULT_CARRIER_TIMEOUT_SECS);
        let poll_secs = parse_or_default(&lookup, "PAYWATCH_POLL_INTERVAL", DEFAULT_POLL_INTERVAL_SECS);
        let run_migrations = parse_boolean_flag(lookup("PAYWATCH_RUN_MIGRATIONS"), true);
        Self {
            database_url,
            db_max_connections,
            genesis_block,
            max_confirmations,
            carrier_timeout: Duration::seconds(timeout_secs),
            poll_interval: StdDuration::from_secs(poll_secs),
            run_migrations,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        if self.max_confirmations < 1 {
            return Err(ConfigError::InvalidMaxConfirmations(self.max_confirmations));
        }
        if self.genesis_block < 0 {
            return Err(ConfigError::InvalidGenesisBlock(self.genesis_block));
        }
        if self.carrier_timeout <= Duration::zero() {
            return Err(ConfigError::InvalidCarrierTimeout(self.carrier_timeout.num_seconds()));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::InvalidPollInterval);
        }
        Ok(())
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display + Copy,
    T::Err: Display,
{
    match lookup(key) {
        None => default,
        Some(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {key}. {e} Using the default, {default}, instead.");
            default
        }),
    }
}
