//! Storage module for seeds and scan settings
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - The seed-URL list (CRUD, enable/disable toggling)
//! - Range-validated scan tunables and their resolution per request

mod schema;
mod sqlite;
mod traits;

pub use schema::initialize_schema;
pub use sqlite::SqliteStorage;
pub use traits::{SeedStore, SettingsStore, StorageError, StorageResult};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a seed takes part in scans without an explicit URL list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedStatus {
    Enabled,
    Disabled,
}

impl SeedStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "enabled" => Some(Self::Enabled),
            "disabled" => Some(Self::Disabled),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Enabled => Self::Disabled,
            Self::Disabled => Self::Enabled,
        }
    }
}

impl fmt::Display for SeedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}

/// A persisted crawl starting point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedUrl {
    pub id: String,
    pub url: String,
    pub name: String,
    pub status: SeedStatus,
    pub added_at: String,
}

/// Partial update of a seed; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct SeedUpdate {
    pub url: Option<String>,
    pub name: Option<String>,
    pub status: Option<SeedStatus>,
}

/// A range-validated scan tunable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setting {
    MaxPages,
    MaxDepth,
    TimeLimitSeconds,
    MinPriorityToExpand,
    RequestsPerMinute,
    RequestTimeoutSeconds,
}

impl Setting {
    pub const ALL: [Setting; 6] = [
        Setting::MaxPages,
        Setting::MaxDepth,
        Setting::TimeLimitSeconds,
        Setting::MinPriorityToExpand,
        Setting::RequestsPerMinute,
        Setting::RequestTimeoutSeconds,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaxPages => "max_pages",
            Self::MaxDepth => "max_depth",
            Self::TimeLimitSeconds => "time_limit_seconds",
            Self::MinPriorityToExpand => "min_priority_to_expand",
            Self::RequestsPerMinute => "requests_per_minute",
            Self::RequestTimeoutSeconds => "request_timeout_seconds",
        }
    }
}

impl FromStr for Setting {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Setting::ALL
            .into_iter()
            .find(|setting| setting.as_str() == s)
            .ok_or_else(|| StorageError::UnknownSetting(s.to_string()))
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted bounds and default for one tunable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingRange {
    pub min: i64,
    pub max: i64,
    pub default: i64,
}

impl SettingRange {
    pub const fn new(min: i64, max: i64, default: i64) -> Self {
        Self { min, max, default }
    }

    /// Raises `max` to `min` if needed and clamps `default` into the range
    pub fn normalized(self) -> Self {
        let max = self.max.max(self.min);
        Self {
            min: self.min,
            max,
            default: self.default.clamp(self.min, max),
        }
    }

    /// Clamps a requested value into the range, or uses the default
    pub fn resolve(&self, requested: Option<i64>) -> i64 {
        match requested {
            Some(value) => value.clamp(self.min, self.max.max(self.min)),
            None => self.default,
        }
    }
}

/// Effective scan tunables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSettings {
    pub max_pages: SettingRange,
    pub max_depth: SettingRange,
    pub time_limit_seconds: SettingRange,
    pub min_priority_to_expand: SettingRange,
    pub requests_per_minute: SettingRange,
    pub request_timeout_seconds: SettingRange,
    pub include_subdomains: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            max_pages: SettingRange::new(1, 500, 80),
            max_depth: SettingRange::new(0, 5, 3),
            time_limit_seconds: SettingRange::new(5, 3600, 300),
            min_priority_to_expand: SettingRange::new(0, 10, 3),
            requests_per_minute: SettingRange::new(1, 120, 3),
            request_timeout_seconds: SettingRange::new(3, 60, 12),
            include_subdomains: true,
        }
    }
}

impl ScanSettings {
    pub fn range(&self, setting: Setting) -> SettingRange {
        match setting {
            Setting::MaxPages => self.max_pages,
            Setting::MaxDepth => self.max_depth,
            Setting::TimeLimitSeconds => self.time_limit_seconds,
            Setting::MinPriorityToExpand => self.min_priority_to_expand,
            Setting::RequestsPerMinute => self.requests_per_minute,
            Setting::RequestTimeoutSeconds => self.request_timeout_seconds,
        }
    }

    pub fn set_range(&mut self, setting: Setting, range: SettingRange) {
        let slot = match setting {
            Setting::MaxPages => &mut self.max_pages,
            Setting::MaxDepth => &mut self.max_depth,
            Setting::TimeLimitSeconds => &mut self.time_limit_seconds,
            Setting::MinPriorityToExpand => &mut self.min_priority_to_expand,
            Setting::RequestsPerMinute => &mut self.requests_per_minute,
            Setting::RequestTimeoutSeconds => &mut self.request_timeout_seconds,
        };
        *slot = range;
    }

    /// Effective value of a tunable for one request
    pub fn resolve(&self, setting: Setting, requested: Option<i64>) -> i64 {
        self.range(setting).resolve(requested)
    }

    pub fn resolve_include_subdomains(&self, requested: Option<bool>) -> bool {
        requested.unwrap_or(self.include_subdomains)
    }
}
