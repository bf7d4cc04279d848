//! SQLite-backed adapters.
//!
//! One table, `pvcache (name TEXT PRIMARY KEY, value BLOB, expires_at REAL)`,
//! where `expires_at` is a unix timestamp and `NULL` means "never". Expiry
//! is enforced by this layer: an expired row reads as a miss and is deleted,
//! and a full sweep runs at most once per configured purge interval on top
//! of the per-read checks. Both paths are idempotent.
//!
//! The connection lives behind a mutex. `rusqlite::Connection` is `Send` but
//! not `Sync`, so serializing access through one lock is the Rust shape of
//! "never share a handle across threads".

use crate::adapter::CacheAdapter;
use crate::adapter_async::AsyncCacheAdapter;
use crate::config::CacheConfig;
use crate::error::{CacheError, CacheResult};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS pvcache (
    name TEXT PRIMARY KEY,
    value BLOB,
    expires_at REAL
);";

fn unix_now() -> f64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_secs_f64())
    .unwrap_or(0.0)
}

fn db_err(e: impl std::fmt::Display) -> CacheError {
  CacheError::unavailable("sqlite", e)
}

/// The shared store both the sync and async adapters delegate to.
pub(crate) struct SqliteStore {
  conn: Mutex<Connection>,
  path: PathBuf,
  default_timeout: Option<Duration>,
  purge_every: Duration,
  last_purge: Mutex<Instant>,
}

impl SqliteStore {
  fn open(config: &CacheConfig) -> CacheResult<Self> {
    std::fs::create_dir_all(&config.sqlite_dir).map_err(db_err)?;
    let path = config.sqlite_file();
    let conn = Connection::open(&path).map_err(db_err)?;
    conn.execute_batch(SCHEMA).map_err(db_err)?;
    debug!(path = %path.display(), "opened sqlite cache store");
    Ok(Self {
      conn: Mutex::new(conn),
      path,
      default_timeout: config.default_timeout,
      purge_every: config.purge_every,
      last_purge: Mutex::new(Instant::now()),
    })
  }

  pub(crate) fn path(&self) -> &PathBuf {
    &self.path
  }

  /// Runs the full sweep when the purge interval has elapsed.
  fn maybe_purge(&self) -> CacheResult<()> {
    let due = {
      let last = self.last_purge.lock();
      last.elapsed() >= self.purge_every
    };
    if due {
      self.purge()?;
    }
    Ok(())
  }

  fn purge(&self) -> CacheResult<u64> {
    let dropped = {
      let conn = self.conn.lock();
      conn
        .execute(
          "DELETE FROM pvcache WHERE expires_at IS NOT NULL AND expires_at <= ?1",
          params![unix_now()],
        )
        .map_err(db_err)?
    };
    *self.last_purge.lock() = Instant::now();
    if dropped > 0 {
      debug!(dropped, "sqlite sweep removed expired rows");
    }
    Ok(dropped as u64)
  }

  fn get_raw(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
    self.maybe_purge()?;
    let conn = self.conn.lock();
    let row: Option<(Vec<u8>, Option<f64>)> = conn
      .query_row(
        "SELECT value, expires_at FROM pvcache WHERE name = ?1",
        params![key],
        |r| Ok((r.get(0)?, r.get(1)?)),
      )
      .optional()
      .map_err(db_err)?;
    match row {
      None => Ok(None),
      Some((value, expires_at)) => {
        if expires_at.is_some_and(|at| at <= unix_now()) {
          // Purge-on-read: the row is logically gone.
          conn
            .execute("DELETE FROM pvcache WHERE name = ?1", params![key])
            .map_err(db_err)?;
          Ok(None)
        } else {
          Ok(Some(value))
        }
      }
    }
  }

  fn set_raw(&self, key: &str, value: Vec<u8>, timeout: Option<Duration>) -> CacheResult<()> {
    let expires_at = timeout.map(|d| unix_now() + d.as_secs_f64());
    let conn = self.conn.lock();
    conn
      .execute(
        "INSERT INTO pvcache (name, value, expires_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(name) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at",
        params![key, value, expires_at],
      )
      .map_err(db_err)?;
    Ok(())
  }

  fn remove(&self, keys: &[&str]) -> CacheResult<bool> {
    let conn = self.conn.lock();
    let mut removed = false;
    for key in keys {
      // Only rows still live count toward the return value; the second
      // statement clears out an expired remnant without counting it.
      let live = conn
        .execute(
          "DELETE FROM pvcache WHERE name = ?1 AND (expires_at IS NULL OR expires_at > ?2)",
          params![key, unix_now()],
        )
        .map_err(db_err)?;
      removed |= live > 0;
      conn
        .execute("DELETE FROM pvcache WHERE name = ?1", params![key])
        .map_err(db_err)?;
    }
    Ok(removed)
  }

  fn update_timeout_raw(&self, key: &str, timeout: Option<Duration>) -> CacheResult<Vec<u8>> {
    let value = self.get_raw(key)?.ok_or_else(|| CacheError::Miss {
      key: key.to_string(),
    })?;
    let expires_at = timeout.map(|d| unix_now() + d.as_secs_f64());
    let conn = self.conn.lock();
    conn
      .execute(
        "UPDATE pvcache SET expires_at = ?1 WHERE name = ?2",
        params![expires_at, key],
      )
      .map_err(db_err)?;
    Ok(value)
  }
}

/// A cache adapter persisted to an SQLite database file.
pub struct SqliteAdapter {
  store: Arc<SqliteStore>,
}

impl SqliteAdapter {
  /// Opens (creating if needed) the database at the configured path.
  pub fn open(config: &CacheConfig) -> CacheResult<Self> {
    Ok(Self {
      store: Arc::new(SqliteStore::open(config)?),
    })
  }

  /// Path of the underlying database file.
  pub fn path(&self) -> &PathBuf {
    self.store.path()
  }
}

impl CacheAdapter for SqliteAdapter {
  fn backend(&self) -> &'static str {
    "sqlite"
  }

  fn default_timeout(&self) -> Option<Duration> {
    self.store.default_timeout
  }

  fn get_raw(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
    self.store.get_raw(key)
  }

  fn set_raw(&self, key: &str, value: Vec<u8>, timeout: Option<Duration>) -> CacheResult<()> {
    self.store.set_raw(key, value, timeout)
  }

  fn remove(&self, keys: &[&str]) -> CacheResult<bool> {
    self.store.remove(keys)
  }

  fn update_timeout_raw(&self, key: &str, timeout: Option<Duration>) -> CacheResult<Vec<u8>> {
    self.store.update_timeout_raw(key, timeout)
  }

  fn purge(&self) -> CacheResult<u64> {
    self.store.purge()
  }
}

/// The async twin of [`SqliteAdapter`].
///
/// SQLite's driver is blocking, so every call is offloaded to the runtime's
/// blocking pool instead of stalling an executor thread.
pub struct AsyncSqliteAdapter {
  store: Arc<SqliteStore>,
}

impl AsyncSqliteAdapter {
  /// Opens (creating if needed) the database at the configured path.
  pub fn open(config: &CacheConfig) -> CacheResult<Self> {
    Ok(Self {
      store: Arc::new(SqliteStore::open(config)?),
    })
  }
}

async fn offload<T, F>(job: F) -> CacheResult<T>
where
  T: Send + 'static,
  F: FnOnce() -> CacheResult<T> + Send + 'static,
{
  tokio::task::spawn_blocking(job)
    .await
    .map_err(|e| CacheError::unavailable("sqlite", e))?
}

#[async_trait]
impl AsyncCacheAdapter for AsyncSqliteAdapter {
  fn backend(&self) -> &'static str {
    "sqlite"
  }

  fn default_timeout(&self) -> Option<Duration> {
    self.store.default_timeout
  }

  async fn get_raw(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
    let store = self.store.clone();
    let key = key.to_string();
    offload(move || store.get_raw(&key)).await
  }

  async fn set_raw(&self, key: &str, value: Vec<u8>, timeout: Option<Duration>) -> CacheResult<()> {
    let store = self.store.clone();
    let key = key.to_string();
    offload(move || store.set_raw(&key, value, timeout)).await
  }

  async fn remove(&self, keys: &[&str]) -> CacheResult<bool> {
    let store = self.store.clone();
    let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
    offload(move || {
      let borrowed: Vec<&str> = keys.iter().map(String::as_str).collect();
      store.remove(&borrowed)
    })
    .await
  }

  async fn update_timeout_raw(&self, key: &str, timeout: Option<Duration>) -> CacheResult<Vec<u8>> {
    let store = self.store.clone();
    let key = key.to_string();
    offload(move || store.update_timeout_raw(&key, timeout)).await
  }

  async fn purge(&self) -> CacheResult<u64> {
    let store = self.store.clone();
    offload(move || store.purge()).await
  }
}
