//! Storage traits and error types
//!
//! This module defines the trait interfaces for the seed-URL and scan-settings
//! stores and their associated error types.

use crate::storage::{ScanSettings, SeedStatus, SeedUpdate, SeedUrl, Setting, SettingRange};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Seed not found: {0}")]
    SeedNotFound(String),

    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    #[error("Invalid range for {name}: {reason}")]
    InvalidRange { name: String, reason: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persisted, ordered list of crawl starting points
pub trait SeedStore {
    /// All seeds in insertion order
    fn list_seeds(&self) -> StorageResult<Vec<SeedUrl>>;

    fn get_seed(&self, id: &str) -> StorageResult<SeedUrl>;

    /// Adds a seed; `url` and `name` must be non-empty
    fn add_seed(&mut self, url: &str, name: &str, status: SeedStatus) -> StorageResult<SeedUrl>;

    /// Applies the present fields of `update` to a seed
    fn update_seed(&mut self, id: &str, update: SeedUpdate) -> StorageResult<SeedUrl>;

    fn delete_seed(&mut self, id: &str) -> StorageResult<()>;

    /// Flips a seed between enabled and disabled
    fn toggle_seed(&mut self, id: &str) -> StorageResult<SeedUrl> {
        let seed = self.get_seed(id)?;
        self.update_seed(
            id,
            SeedUpdate {
                status: Some(seed.status.toggled()),
                ..SeedUpdate::default()
            },
        )
    }

    /// Read-only view of the seeds a scan falls back to
    fn enabled_seeds(&self) -> StorageResult<Vec<SeedUrl>> {
        Ok(self
            .list_seeds()?
            .into_iter()
            .filter(|seed| seed.status == SeedStatus::Enabled)
            .collect())
    }
}

/// Persisted `{min, max, default}` ranges for scan tunables
pub trait SettingsStore {
    fn load_settings(&self) -> StorageResult<ScanSettings>;

    /// Stores a normalized range for one tunable and returns what was stored
    fn update_range(&mut self, setting: Setting, range: SettingRange)
        -> StorageResult<SettingRange>;

    fn set_include_subdomains(&mut self, value: bool) -> StorageResult<()>;
}
