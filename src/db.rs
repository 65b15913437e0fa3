use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

/// String-keyed persistence port behind the saved UI state.
pub trait KeyValueStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>>;
    fn set_raw(&self, key: &str, value: &str) -> Result<()>;
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        Ok(Self { conn })
    }

    pub fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }
}

impl KeyValueStore for Database {
    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_state WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("failed to read state entry '{key}'"))?;
        Ok(value)
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                r#"
                INSERT INTO kv_state (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
                params![key, value, now],
            )
            .with_context(|| format!("failed to write state entry '{key}'"))?;
        Ok(())
    }
}

/// Non-persistent store for `--ephemeral` runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_round_trips_and_overwrites_values() {
        let db = Database::open_in_memory().expect("open db");
        db.migrate().expect("migrate");

        assert_eq!(db.get_raw("language").expect("read"), None);
        db.set_raw("language", "\"zh\"").expect("write");
        db.set_raw("language", "\"en\"").expect("overwrite");
        assert_eq!(
            db.get_raw("language").expect("read").as_deref(),
            Some("\"en\"")
        );
    }

    #[test]
    fn migrate_is_repeatable() {
        let db = Database::open_in_memory().expect("open db");
        db.migrate().expect("first migrate");
        db.set_raw("selectedAnimeIndices", "[]").expect("write");
        db.migrate().expect("second migrate");
        assert_eq!(
            db.get_raw("selectedAnimeIndices").expect("read").as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn memory_store_keeps_last_write() {
        let store = MemoryStore::new();
        store.set_raw("k", "1").expect("write");
        store.set_raw("k", "2").expect("write");
        assert_eq!(store.get_raw("k").expect("read").as_deref(), Some("2"));
        assert_eq!(store.get_raw("missing").expect("read"), None);
    }
}
