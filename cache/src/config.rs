//! Connection and behavior settings shared by every backend.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

/// Default entry lifetime when callers pass [`Ttl::Default`](crate::Ttl::Default).
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_secs(300);

/// How often file/process backed adapters run a full expired-entry sweep.
pub const DEFAULT_PURGE_EVERY: Duration = Duration::from_secs(30);

/// Connect/operation timeout applied to network-backed adapters.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for cache adapters and the facade.
///
/// Construct with [`CacheConfig::default`] and override fields with the
/// builder-style setters, or pull everything from the environment with
/// [`CacheConfig::from_env`].
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
  /// Alias of the adapter the sync facade opens when built from config.
  pub adapter: String,
  /// Alias of the adapter the async facade opens when built from config.
  pub adapter_async: String,
  /// Lifetime applied when an operation asks for the default timeout.
  /// `None` means such entries never expire.
  pub default_timeout: Option<Duration>,
  /// Interval between full expired-entry sweeps (memory and SQLite).
  pub purge_every: Duration,
  /// Connect and per-operation timeout for Redis and Memcached.
  pub op_timeout: Duration,

  pub redis_host: String,
  pub redis_port: u16,
  pub redis_db: i64,

  pub memcached_host: String,
  pub memcached_port: u16,

  /// Directory holding the SQLite cache database. Created on open.
  pub sqlite_dir: PathBuf,
  /// Filename of the SQLite cache database inside `sqlite_dir`.
  pub sqlite_db: String,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      adapter: "memory".to_string(),
      adapter_async: "memory".to_string(),
      default_timeout: Some(DEFAULT_CACHE_TIMEOUT),
      purge_every: DEFAULT_PURGE_EVERY,
      op_timeout: DEFAULT_OP_TIMEOUT,
      redis_host: "localhost".to_string(),
      redis_port: 6379,
      redis_db: 0,
      memcached_host: "localhost".to_string(),
      memcached_port: 11211,
      sqlite_dir: default_sqlite_dir(),
      sqlite_db: "hoard-cache.sqlite3".to_string(),
    }
  }
}

impl CacheConfig {
  /// Builds a config from environment variables, falling back to the
  /// defaults for anything unset. Unparsable values are ignored with a
  /// warning rather than failing startup.
  ///
  /// Recognized variables: `CACHE_ADAPTER`, `CACHE_ADAPTER_ASYNC`,
  /// `CACHE_TIMEOUT` (seconds, `0` disables expiry), `CACHE_PURGE_EVERY`,
  /// `CACHE_OP_TIMEOUT`, `CACHE_REDIS_HOST`, `CACHE_REDIS_PORT`,
  /// `CACHE_REDIS_DB`, `CACHE_MEMCACHED_HOST`, `CACHE_MEMCACHED_PORT`,
  /// `CACHE_SQLITE_DIR`, `CACHE_SQLITE_DB`.
  pub fn from_env() -> Self {
    let mut cfg = Self::default();
    if let Ok(v) = env::var("CACHE_ADAPTER") {
      cfg.adapter = v;
    }
    if let Ok(v) = env::var("CACHE_ADAPTER_ASYNC") {
      cfg.adapter_async = v;
    }
    if let Some(secs) = env_u64("CACHE_TIMEOUT") {
      cfg.default_timeout = if secs == 0 {
        None
      } else {
        Some(Duration::from_secs(secs))
      };
    }
    if let Some(secs) = env_u64("CACHE_PURGE_EVERY") {
      cfg.purge_every = Duration::from_secs(secs.max(1));
    }
    if let Some(secs) = env_u64("CACHE_OP_TIMEOUT") {
      cfg.op_timeout = Duration::from_secs(secs.max(1));
    }
    if let Ok(v) = env::var("CACHE_REDIS_HOST") {
      cfg.redis_host = v;
    }
    if let Some(port) = env_u64("CACHE_REDIS_PORT") {
      cfg.redis_port = port as u16;
    }
    if let Some(db) = env_u64("CACHE_REDIS_DB") {
      cfg.redis_db = db as i64;
    }
    if let Ok(v) = env::var("CACHE_MEMCACHED_HOST") {
      cfg.memcached_host = v;
    }
    if let Some(port) = env_u64("CACHE_MEMCACHED_PORT") {
      cfg.memcached_port = port as u16;
    }
    if let Ok(v) = env::var("CACHE_SQLITE_DIR") {
      cfg.sqlite_dir = PathBuf::from(v);
    }
    if let Ok(v) = env::var("CACHE_SQLITE_DB") {
      cfg.sqlite_db = v;
    }
    cfg
  }

  /// Sets the alias used by both the sync and async facades.
  pub fn adapter(mut self, alias: impl Into<String>) -> Self {
    let alias = alias.into();
    self.adapter = alias.clone();
    self.adapter_async = alias;
    self
  }

  /// Sets the default entry lifetime.
  pub fn timeout(mut self, timeout: Duration) -> Self {
    self.default_timeout = Some(timeout);
    self
  }

  /// Makes entries stored with the default timeout never expire.
  pub fn never_expire(mut self) -> Self {
    self.default_timeout = None;
    self
  }

  pub fn purge_every(mut self, interval: Duration) -> Self {
    self.purge_every = interval;
    self
  }

  pub fn op_timeout(mut self, timeout: Duration) -> Self {
    self.op_timeout = timeout;
    self
  }

  pub fn redis(mut self, host: impl Into<String>, port: u16, db: i64) -> Self {
    self.redis_host = host.into();
    self.redis_port = port;
    self.redis_db = db;
    self
  }

  pub fn memcached(mut self, host: impl Into<String>, port: u16) -> Self {
    self.memcached_host = host.into();
    self.memcached_port = port;
    self
  }

  pub fn sqlite_path(mut self, dir: impl Into<PathBuf>, db: impl Into<String>) -> Self {
    self.sqlite_dir = dir.into();
    self.sqlite_db = db.into();
    self
  }

  /// Full path of the SQLite cache database file.
  pub fn sqlite_file(&self) -> PathBuf {
    self.sqlite_dir.join(&self.sqlite_db)
  }

  pub fn redis_url(&self) -> String {
    format!(
      "redis://{}:{}/{}",
      self.redis_host, self.redis_port, self.redis_db
    )
  }

  pub fn memcached_url(&self) -> String {
    format!(
      "memcache://{}:{}?timeout={}",
      self.memcached_host,
      self.memcached_port,
      self.op_timeout.as_secs().max(1)
    )
  }
}

fn env_u64(name: &str) -> Option<u64> {
  let raw = env::var(name).ok()?;
  match raw.trim().parse::<u64>() {
    Ok(v) => Some(v),
    Err(_) => {
      warn!(var = name, value = %raw, "ignoring unparsable cache setting");
      None
    }
  }
}

fn default_sqlite_dir() -> PathBuf {
  match env::var_os("HOME") {
    Some(home) => PathBuf::from(home).join(".hoard"),
    None => env::temp_dir().join("hoard"),
  }
}
