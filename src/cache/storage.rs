//! Local store trait and its SQLite and in-memory implementations.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Trait for local persistence backends.
///
/// A dumb namespaced blob store: one value per key, whole values in and out.
/// Record shapes are never validated here.
pub trait LocalStore: Send + Sync {
  /// Read the raw value stored under a key.
  fn read(&self, key: &str) -> Result<Option<String>>;

  /// Replace the raw value stored under a key.
  fn write(&self, key: &str, value: &str) -> Result<()>;

  /// Remove a key. Missing keys are not an error.
  fn remove(&self, key: &str) -> Result<()>;

  /// Load a whole collection.
  fn load<T: DeserializeOwned>(&self, collection: &str) -> Result<Option<Vec<T>>>
  where
    Self: Sized,
  {
    match self.read(collection)? {
      Some(raw) => serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| eyre!("Failed to decode cached {}: {}", collection, e)),
      None => Ok(None),
    }
  }

  /// Save a whole collection, replacing what was there.
  fn save<T: Serialize>(&self, collection: &str, items: &[T]) -> Result<()>
  where
    Self: Sized,
  {
    let raw = serde_json::to_string(items)
      .map_err(|e| eyre!("Failed to encode {} for cache: {}", collection, e))?;
    self.write(collection, &raw)
  }
}

/// Store that keeps everything in process memory.
///
/// Used when persistence is disabled and as the test backend.
#[derive(Default)]
pub struct MemoryStore {
  namespace: String,
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new(namespace: &str) -> Self {
    Self {
      namespace: namespace.to_string(),
      entries: Mutex::new(HashMap::new()),
    }
  }

  fn scoped(&self, key: &str) -> String {
    format!("{}_{}", self.namespace, key)
  }
}

impl LocalStore for MemoryStore {
  fn read(&self, key: &str) -> Result<Option<String>> {
    let entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(entries.get(&self.scoped(key)).cloned())
  }

  fn write(&self, key: &str, value: &str) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    entries.insert(self.scoped(key), value.to_string());
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    entries.remove(&self.scoped(key));
    Ok(())
  }
}

/// SQLite-based local store.
pub struct SqliteStore {
  conn: Mutex<Connection>,
  namespace: String,
}

impl SqliteStore {
  /// Open (or create) the store at the given path, or the default location.
  pub fn open(path: Option<&Path>, namespace: &str) -> Result<Self> {
    let path = match path {
      Some(p) => p.to_path_buf(),
      None => Self::default_path()?,
    };

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(&path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    let store = Self {
      conn: Mutex::new(conn),
      namespace: namespace.to_string(),
    };
    store.run_migrations()?;

    Ok(store)
  }

  /// Get the default database path.
  fn default_path() -> Result<PathBuf> {
    Ok(crate::config::data_dir()?.join("cache.db"))
  }

  /// Run database migrations for the store table.
  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(STORE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }
}

/// Schema for the key-value table.
const STORE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv_store (
    namespace TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (namespace, key)
);
"#;

impl LocalStore for SqliteStore {
  fn read(&self, key: &str) -> Result<Option<String>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .query_row(
        "SELECT value FROM kv_store WHERE namespace = ? AND key = ?",
        params![self.namespace, key],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read {} from cache: {}", key, e))
  }

  fn write(&self, key: &str, value: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO kv_store (namespace, key, value, updated_at)
         VALUES (?, ?, ?, datetime('now'))",
        params![self.namespace, key, value],
      )
      .map_err(|e| eyre!("Failed to write {} to cache: {}", key, e))?;

    Ok(())
  }

  fn remove(&self, key: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "DELETE FROM kv_store WHERE namespace = ? AND key = ?",
        params![self.namespace, key],
      )
      .map_err(|e| eyre!("Failed to remove {} from cache: {}", key, e))?;

    Ok(())
  }
}
