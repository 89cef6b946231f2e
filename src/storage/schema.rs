//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Leakwatch database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Seed URLs, listed in insertion order
CREATE TABLE IF NOT EXISTS seeds (
    position INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    url TEXT NOT NULL,
    name TEXT NOT NULL,
    status TEXT NOT NULL,
    added_at TEXT NOT NULL
);

-- Range-validated scan tunables
CREATE TABLE IF NOT EXISTS scan_settings (
    name TEXT PRIMARY KEY,
    min_value INTEGER NOT NULL,
    max_value INTEGER NOT NULL,
    default_value INTEGER NOT NULL
);

-- Boolean scan defaults
CREATE TABLE IF NOT EXISTS scan_flags (
    name TEXT PRIMARY KEY,
    value INTEGER NOT NULL
);
"#;

/// Initializes the database schema and seeds default settings
///
/// Existing settings are left untouched, so this is safe to run on every start.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    seed_default_settings(conn)?;
    Ok(())
}

fn seed_default_settings(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    use crate::storage::{ScanSettings, Setting};

    let defaults = ScanSettings::default();
    for setting in Setting::ALL {
        let range = defaults.range(setting);
        conn.execute(
            "INSERT OR IGNORE INTO scan_settings (name, min_value, max_value, default_value)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![setting.as_str(), range.min, range.max, range.default],
        )?;
    }
    conn.execute(
        "INSERT OR IGNORE INTO scan_flags (name, value) VALUES ('include_subdomains', ?1)",
        rusqlite::params![defaults.include_subdomains],
    )?;
    Ok(())
}
