//! Environment-driven configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use shelflife_core::LookaheadWindow;
use shelflife_evaluator::RepeatPolicy;
use shelflife_notify::PermissionState;
use shelflife_observability::LogFormat;
use shelflife_store::StoreConfig;
use thiserror::Error;

pub const ENV_DB_PATH: &str = "SHELFLIFE_DB_PATH";
pub const ENV_SCHEMA_VERSION: &str = "SHELFLIFE_SCHEMA_VERSION";
pub const ENV_LOOKAHEAD_DAYS: &str = "SHELFLIFE_LOOKAHEAD_DAYS";
pub const ENV_CHECK_INTERVAL_SECS: &str = "SHELFLIFE_CHECK_INTERVAL_SECS";
pub const ENV_REPEAT_MIN_DAYS: &str = "SHELFLIFE_REPEAT_MIN_DAYS";
pub const ENV_NOTIFICATIONS: &str = "SHELFLIFE_NOTIFICATIONS";
pub const ENV_LOG_FORMAT: &str = "SHELFLIFE_LOG_FORMAT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has an invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `None` means the per-user data directory.
    pub db_path: Option<PathBuf>,
    pub schema_version: u32,
    pub lookahead: LookaheadWindow,
    pub check_interval: Duration,
    pub repeat: RepeatPolicy,
    pub notifications: PermissionState,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            schema_version: StoreConfig::DEFAULT_SCHEMA_VERSION,
            lookahead: LookaheadWindow::default(),
            check_interval: Duration::from_secs(24 * 60 * 60),
            repeat: RepeatPolicy::EveryRun,
            notifications: PermissionState::Granted,
            log_format: LogFormat::Json,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`; unset variables keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let db_path = lookup(ENV_DB_PATH)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let schema_version =
            parse_var(&lookup, ENV_SCHEMA_VERSION)?.unwrap_or(defaults.schema_version);

        let lookahead = match parse_var::<i64, _>(&lookup, ENV_LOOKAHEAD_DAYS)? {
            Some(days) if days < 0 => {
                return Err(invalid(ENV_LOOKAHEAD_DAYS, days.to_string(), "must not be negative"));
            }
            Some(days) => LookaheadWindow::days(days),
            None => defaults.lookahead,
        };

        let check_interval = match parse_var::<u64, _>(&lookup, ENV_CHECK_INTERVAL_SECS)? {
            Some(0) => {
                return Err(invalid(ENV_CHECK_INTERVAL_SECS, "0".to_string(), "must be positive"));
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.check_interval,
        };

        let repeat = parse_var::<u32, _>(&lookup, ENV_REPEAT_MIN_DAYS)?
            .map(RepeatPolicy::MinDaysBetween)
            .unwrap_or(defaults.repeat);

        let notifications =
            parse_var(&lookup, ENV_NOTIFICATIONS)?.unwrap_or(defaults.notifications);

        let log_format = parse_var(&lookup, ENV_LOG_FORMAT)?.unwrap_or(defaults.log_format);

        Ok(Self {
            db_path,
            schema_version,
            lookahead,
            check_interval,
            repeat,
            notifications,
            log_format,
        })
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|err: T::Err| invalid(var, raw.clone(), err.to_string())),
    }
}

fn invalid(var: &'static str, value: String, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        var,
        value,
        reason: reason.into(),
    }
}
