//! Runtime configuration
//!
//! Everything is read from `HEALTHDASH_*` environment variables; unset
//! variables fall back to defaults.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::FixedOffset;
use serde::Serialize;
use thiserror::Error;

use crate::progress::dates::{default_offset, offset_from_hours, DEFAULT_UTC_OFFSET_HOURS};

pub const ENV_DATABASE_PATH: &str = "HEALTHDASH_DATABASE_PATH";
pub const ENV_STORAGE: &str = "HEALTHDASH_STORAGE";
pub const ENV_UTC_OFFSET_HOURS: &str = "HEALTHDASH_UTC_OFFSET_HOURS";
pub const ENV_TRAJECTORY_WINDOW_DAYS: &str = "HEALTHDASH_TRAJECTORY_WINDOW_DAYS";

/// Days shown by trajectory and comparison views unless asked otherwise
pub const DEFAULT_TRAJECTORY_WINDOW_DAYS: u32 = 30;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}='{value}' is invalid: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Which store backs records and goals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Sqlite => "sqlite",
            StorageBackend::Memory => "memory",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "" => Ok(StorageBackend::Sqlite),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub storage: StorageBackend,
    pub utc_offset_hours: i32,
    pub trajectory_window_days: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            storage: StorageBackend::default(),
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            trajectory_window_days: DEFAULT_TRAJECTORY_WINDOW_DAYS,
        }
    }
}

/// `data/healthdash.db` under the project root (or next to the binary)
pub fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(parent) = path.parent() {
            if let Some(grandparent) = parent.parent() {
                path = grandparent.to_path_buf();
            }
        }
    }

    path.push("data");
    path.push("healthdash.db");
    path
}

impl AppConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DATABASE_PATH).filter(|p| !p.trim().is_empty()) {
            config.database_path = PathBuf::from(path);
        }

        if let Some(raw) = lookup(ENV_STORAGE) {
            config.storage = raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: ENV_STORAGE,
                value: raw.clone(),
                reason: "expected 'sqlite' or 'memory'",
            })?;
        }

        if let Some(raw) = lookup(ENV_UTC_OFFSET_HOURS) {
            config.utc_offset_hours = raw
                .trim()
                .parse::<i32>()
                .ok()
                .filter(|h| offset_from_hours(*h).is_some())
                .ok_or_else(|| ConfigError::InvalidValue {
                    var: ENV_UTC_OFFSET_HOURS,
                    value: raw.clone(),
                    reason: "expected whole hours between -12 and 14",
                })?;
        }

        if let Some(raw) = lookup(ENV_TRAJECTORY_WINDOW_DAYS) {
            config.trajectory_window_days = raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|d| *d >= 1)
                .ok_or_else(|| ConfigError::InvalidValue {
                    var: ENV_TRAJECTORY_WINDOW_DAYS,
                    value: raw.clone(),
                    reason: "expected a positive number of days",
                })?;
        }

        Ok(config)
    }

    /// Offset used to decide what "today" is
    pub fn utc_offset(&self) -> FixedOffset {
        offset_from_hours(self.utc_offset_hours).unwrap_or_else(default_offset)
    }
}
