//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the seed and
//! settings store traits.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{SeedStore, SettingsStore, StorageError, StorageResult};
use crate::storage::{ScanSettings, SeedStatus, SeedUpdate, SeedUrl, Setting, SettingRange};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (creating if needed) the database at `path`
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Millisecond-timestamp id, bumped until unused
    fn next_seed_id(&self) -> StorageResult<String> {
        let mut candidate = Utc::now().timestamp_millis();
        loop {
            let id = candidate.to_string();
            let taken: Option<i64> = self
                .conn
                .query_row("SELECT position FROM seeds WHERE id = ?1", params![id], |row| {
                    row.get(0)
                })
                .optional()?;
            if taken.is_none() {
                return Ok(id);
            }
            candidate += 1;
        }
    }
}

fn seed_from_row(row: &Row<'_>) -> rusqlite::Result<SeedUrl> {
    let status: String = row.get(3)?;
    Ok(SeedUrl {
        id: row.get(0)?,
        url: row.get(1)?,
        name: row.get(2)?,
        status: SeedStatus::from_db_string(&status).unwrap_or(SeedStatus::Disabled),
        added_at: row.get(4)?,
    })
}

fn require_non_empty(field: &str, value: &str) -> StorageResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StorageError::InvalidSeed(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

impl SeedStore for SqliteStorage {
    fn list_seeds(&self) -> StorageResult<Vec<SeedUrl>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, url, name, status, added_at FROM seeds ORDER BY position")?;
        let seeds = stmt
            .query_map([], seed_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(seeds)
    }

    fn get_seed(&self, id: &str) -> StorageResult<SeedUrl> {
        self.conn
            .query_row(
                "SELECT id, url, name, status, added_at FROM seeds WHERE id = ?1",
                params![id],
                seed_from_row,
            )
            .optional()?
            .ok_or_else(|| StorageError::SeedNotFound(id.to_string()))
    }

    fn add_seed(&mut self, url: &str, name: &str, status: SeedStatus) -> StorageResult<SeedUrl> {
        let url = require_non_empty("url", url)?;
        let name = require_non_empty("name", name)?;
        let id = self.next_seed_id()?;
        let added_at = Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT INTO seeds (id, url, name, status, added_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, url, name, status.to_db_string(), added_at],
        )?;

        tracing::debug!("Added seed {} ({})", id, url);

        Ok(SeedUrl {
            id,
            url,
            name,
            status,
            added_at,
        })
    }

    fn update_seed(&mut self, id: &str, update: SeedUpdate) -> StorageResult<SeedUrl> {
        let mut seed = self.get_seed(id)?;

        if let Some(url) = update.url {
            seed.url = require_non_empty("url", &url)?;
        }
        if let Some(name) = update.name {
            seed.name = require_non_empty("name", &name)?;
        }
        if let Some(status) = update.status {
            seed.status = status;
        }

        self.conn.execute(
            "UPDATE seeds SET url = ?1, name = ?2, status = ?3 WHERE id = ?4",
            params![seed.url, seed.name, seed.status.to_db_string(), id],
        )?;

        Ok(seed)
    }

    fn delete_seed(&mut self, id: &str) -> StorageResult<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM seeds WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StorageError::SeedNotFound(id.to_string()));
        }
        Ok(())
    }
}

impl SettingsStore for SqliteStorage {
    fn load_settings(&self) -> StorageResult<ScanSettings> {
        let mut settings = ScanSettings::default();

        let mut stmt = self
            .conn
            .prepare("SELECT name, min_value, max_value, default_value FROM scan_settings")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                SettingRange::new(row.get(1)?, row.get(2)?, row.get(3)?),
            ))
        })?;

        for row in rows {
            let (name, range) = row?;
            match name.parse::<Setting>() {
                Ok(setting) => settings.set_range(setting, range),
                Err(_) => tracing::warn!("Ignoring unknown stored setting '{}'", name),
            }
        }

        let include_subdomains: Option<bool> = self
            .conn
            .query_row(
                "SELECT value FROM scan_flags WHERE name = 'include_subdomains'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(value) = include_subdomains {
            settings.include_subdomains = value;
        }

        Ok(settings)
    }

    fn update_range(
        &mut self,
        setting: Setting,
        range: SettingRange,
    ) -> StorageResult<SettingRange> {
        if range.min < 0 {
            return Err(StorageError::InvalidRange {
                name: setting.to_string(),
                reason: format!("minimum must not be negative, got {}", range.min),
            });
        }

        let range = range.normalized();
        self.conn.execute(
            "INSERT INTO scan_settings (name, min_value, max_value, default_value)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(name) DO UPDATE SET
                min_value = excluded.min_value,
                max_value = excluded.max_value,
                default_value = excluded.default_value",
            params![setting.as_str(), range.min, range.max, range.default],
        )?;

        Ok(range)
    }

    fn set_include_subdomains(&mut self, value: bool) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO scan_flags (name, value) VALUES ('include_subdomains', ?1)
             ON CONFLICT(name) DO UPDATE SET value = excluded.value",
            params![value],
        )?;
        Ok(())
    }
}
