use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use crate::error::LibraryResult;

/// Storage key for the user-added (custom) book subset.
pub const CUSTOM_BOOKS_KEY: &str = "customBooks";
/// Storage key for the full collection sequence.
pub const COLLECTIONS_KEY: &str = "collectionsData";

/// Durable string-keyed blob storage. Values are JSON-serialized sequences;
/// every write is a full overwrite of the key.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> LibraryResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> LibraryResult<()>;
    fn remove(&self, key: &str) -> LibraryResult<()>;
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> LibraryResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> LibraryResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> LibraryResult<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT
            )",
            [],
        )?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> LibraryResult<Option<String>> {
        let conn = self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let value = conn
            .query_row("SELECT value FROM meta WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> LibraryResult<()> {
        let conn = self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        conn.execute(
            "INSERT INTO meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> LibraryResult<()> {
        let conn = self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        conn.execute("DELETE FROM meta WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// Ephemeral store used by tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> LibraryResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> LibraryResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> LibraryResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.remove(key);
        Ok(())
    }
}

/// Reads a JSON sequence from the store. Absent, unreadable or malformed
/// values all fall back to an empty sequence.
pub(crate) fn read_json_seq<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Vec<T> {
    let raw = match store.get(key) {
        Ok(Some(value)) => value,
        Ok(None) => return Vec::new(),
        Err(err) => {
            log::warn!("could not read {}: {}", key, err);
            return Vec::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(err) => {
            log::warn!("discarding malformed {}: {}", key, err);
            Vec::new()
        }
    }
}

/// Overwrites a key with a JSON sequence. Best-effort: the in-memory mutation
/// has already happened, so a write failure is only logged.
pub(crate) fn write_json_seq<T: Serialize>(store: &dyn KeyValueStore, key: &str, items: &[T]) {
    let raw = match serde_json::to_string(items) {
        Ok(value) => value,
        Err(err) => {
            log::error!("could not serialize {}: {}", key, err);
            return;
        }
    };
    if let Err(err) = store.set(key, &raw) {
        log::error!("could not persist {}: {}", key, err);
    }
}
