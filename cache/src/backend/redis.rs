//! Redis-backed adapters.
//!
//! Thin command translation: `set` maps to `SET`/`SETEX`, expiry rides on
//! Redis' native TTL mechanism, and `purge` is a no-op because the server
//! drops expired keys itself. Connect and per-operation timeouts come from
//! [`CacheConfig::op_timeout`]; an elapsed timeout surfaces as
//! [`CacheError::Unavailable`], never as a miss.

use crate::adapter::CacheAdapter;
use crate::adapter_async::AsyncCacheAdapter;
use crate::config::CacheConfig;
use crate::error::{CacheError, CacheResult};

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use redis::{AsyncCommands, Commands};
use tracing::debug;

fn redis_err(e: impl std::fmt::Display) -> CacheError {
  CacheError::unavailable("redis", e)
}

fn ttl_secs(timeout: Duration) -> u64 {
  // Redis rejects SETEX 0; a sub-second timeout rounds up to one second.
  timeout.as_secs().max(1)
}

/// A cache adapter speaking to a Redis server over a single blocking
/// connection.
pub struct RedisAdapter {
  conn: Mutex<redis::Connection>,
  default_timeout: Option<Duration>,
}

impl RedisAdapter {
  /// Connects to the configured server, applying the configured connect
  /// and socket timeouts.
  pub fn open(config: &CacheConfig) -> CacheResult<Self> {
    let client = redis::Client::open(config.redis_url()).map_err(redis_err)?;
    let conn = client
      .get_connection_with_timeout(config.op_timeout)
      .map_err(redis_err)?;
    conn
      .set_read_timeout(Some(config.op_timeout))
      .map_err(redis_err)?;
    conn
      .set_write_timeout(Some(config.op_timeout))
      .map_err(redis_err)?;
    debug!(url = %config.redis_url(), "connected to redis");
    Ok(Self {
      conn: Mutex::new(conn),
      default_timeout: config.default_timeout,
    })
  }
}

impl std::fmt::Debug for RedisAdapter {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RedisAdapter").finish_non_exhaustive()
  }
}

impl CacheAdapter for RedisAdapter {
  fn backend(&self) -> &'static str {
    "redis"
  }

  fn default_timeout(&self) -> Option<Duration> {
    self.default_timeout
  }

  fn get_raw(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
    let mut conn = self.conn.lock();
    conn.get(key).map_err(redis_err)
  }

  fn set_raw(&self, key: &str, value: Vec<u8>, timeout: Option<Duration>) -> CacheResult<()> {
    let mut conn = self.conn.lock();
    match timeout {
      Some(t) => conn.set_ex(key, value, ttl_secs(t)).map_err(redis_err),
      None => conn.set(key, value).map_err(redis_err),
    }
  }

  fn remove(&self, keys: &[&str]) -> CacheResult<bool> {
    let mut conn = self.conn.lock();
    let removed: i64 = conn.del(keys).map_err(redis_err)?;
    Ok(removed > 0)
  }

  fn update_timeout_raw(&self, key: &str, timeout: Option<Duration>) -> CacheResult<Vec<u8>> {
    let mut conn = self.conn.lock();
    let value: Option<Vec<u8>> = conn.get(key).map_err(redis_err)?;
    let value = value.ok_or_else(|| CacheError::Miss {
      key: key.to_string(),
    })?;
    match timeout {
      Some(t) => {
        let _: bool = conn.expire(key, ttl_secs(t) as i64).map_err(redis_err)?;
      }
      None => {
        let _: bool = conn.persist(key).map_err(redis_err)?;
      }
    }
    Ok(value)
  }

  fn purge(&self) -> CacheResult<u64> {
    // Redis expires keys natively.
    Ok(0)
  }
}

/// The async twin of [`RedisAdapter`], over a multiplexed Tokio connection.
pub struct AsyncRedisAdapter {
  conn: redis::aio::MultiplexedConnection,
  op_timeout: Duration,
  default_timeout: Option<Duration>,
}

impl AsyncRedisAdapter {
  /// Connects to the configured server.
  pub async fn open(config: &CacheConfig) -> CacheResult<Self> {
    let client = redis::Client::open(config.redis_url()).map_err(redis_err)?;
    let conn = tokio::time::timeout(
      config.op_timeout,
      client.get_multiplexed_async_connection(),
    )
    .await
    .map_err(|_| redis_err("connect timed out"))?
    .map_err(redis_err)?;
    debug!(url = %config.redis_url(), "connected to redis");
    Ok(Self {
      conn,
      op_timeout: config.op_timeout,
      default_timeout: config.default_timeout,
    })
  }

  /// Bounds a command future by the configured operation timeout.
  async fn io<T, F>(&self, fut: F) -> CacheResult<T>
  where
    F: Future<Output = redis::RedisResult<T>>,
  {
    match tokio::time::timeout(self.op_timeout, fut).await {
      Ok(res) => res.map_err(redis_err),
      Err(_) => Err(redis_err("operation timed out")),
    }
  }
}

impl std::fmt::Debug for AsyncRedisAdapter {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AsyncRedisAdapter").finish_non_exhaustive()
  }
}

#[async_trait]
impl AsyncCacheAdapter for AsyncRedisAdapter {
  fn backend(&self) -> &'static str {
    "redis"
  }

  fn default_timeout(&self) -> Option<Duration> {
    self.default_timeout
  }

  async fn get_raw(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
    let mut conn = self.conn.clone();
    self.io(conn.get(key)).await
  }

  async fn set_raw(&self, key: &str, value: Vec<u8>, timeout: Option<Duration>) -> CacheResult<()> {
    let mut conn = self.conn.clone();
    match timeout {
      Some(t) => self.io(conn.set_ex(key, value, ttl_secs(t))).await,
      None => self.io(conn.set(key, value)).await,
    }
  }

  async fn remove(&self, keys: &[&str]) -> CacheResult<bool> {
    let mut conn = self.conn.clone();
    let removed: i64 = self.io(conn.del(keys)).await?;
    Ok(removed > 0)
  }

  async fn update_timeout_raw(&self, key: &str, timeout: Option<Duration>) -> CacheResult<Vec<u8>> {
    let mut conn = self.conn.clone();
    let value: Option<Vec<u8>> = self.io(conn.get(key)).await?;
    let value = value.ok_or_else(|| CacheError::Miss {
      key: key.to_string(),
    })?;
    match timeout {
      Some(t) => {
        let _: bool = self.io(conn.expire(key, ttl_secs(t) as i64)).await?;
      }
      None => {
        let _: bool = self.io(conn.persist(key)).await?;
      }
    }
    Ok(value)
  }

  async fn purge(&self) -> CacheResult<u64> {
    Ok(0)
  }
}
