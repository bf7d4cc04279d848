//! Memcached-backed adapters.
//!
//! Values are stored as raw byte slices; expiry rides on Memcached's native
//! TTL (`0` = never) and `update_timeout` maps to `touch`. Key length and
//! character restrictions are Memcached's own and are left to the caller.
//!
//! The client library is blocking, so the async adapter offloads every call
//! to the runtime's blocking pool, same as the SQLite one.

use crate::adapter::CacheAdapter;
use crate::adapter_async::AsyncCacheAdapter;
use crate::config::CacheConfig;
use crate::error::{CacheError, CacheResult};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

fn mc_err(e: impl std::fmt::Display) -> CacheError {
  CacheError::unavailable("memcached", e)
}

fn expiration(timeout: Option<Duration>) -> u32 {
  // 0 means "never expire"; sub-second timeouts round up to one second.
  match timeout {
    Some(t) => t.as_secs().max(1) as u32,
    None => 0,
  }
}

pub(crate) struct MemcachedStore {
  client: memcache::Client,
  default_timeout: Option<Duration>,
}

impl MemcachedStore {
  fn connect(config: &CacheConfig) -> CacheResult<Self> {
    let url = config.memcached_url();
    let client = memcache::Client::connect(url.as_str()).map_err(mc_err)?;
    debug!(url = %url, "connected to memcached");
    Ok(Self {
      client,
      default_timeout: config.default_timeout,
    })
  }

  fn get_raw(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
    self.client.get::<Vec<u8>>(key).map_err(mc_err)
  }

  fn set_raw(&self, key: &str, value: Vec<u8>, timeout: Option<Duration>) -> CacheResult<()> {
    self
      .client
      .set(key, &value[..], expiration(timeout))
      .map_err(mc_err)
  }

  fn remove(&self, keys: &[&str]) -> CacheResult<bool> {
    let mut removed = false;
    for key in keys {
      removed |= self.client.delete(key).map_err(mc_err)?;
    }
    Ok(removed)
  }

  fn update_timeout_raw(&self, key: &str, timeout: Option<Duration>) -> CacheResult<Vec<u8>> {
    let value = self.get_raw(key)?.ok_or_else(|| CacheError::Miss {
      key: key.to_string(),
    })?;
    let touched = self.client.touch(key, expiration(timeout)).map_err(mc_err)?;
    if !touched {
      // The key expired between the read and the touch.
      return Err(CacheError::Miss {
        key: key.to_string(),
      });
    }
    Ok(value)
  }
}

/// A cache adapter speaking to a Memcached server.
pub struct MemcachedAdapter {
  store: Arc<MemcachedStore>,
}

impl MemcachedAdapter {
  /// Connects to the configured server. The socket timeout is carried in
  /// the connection URL.
  pub fn open(config: &CacheConfig) -> CacheResult<Self> {
    Ok(Self {
      store: Arc::new(MemcachedStore::connect(config)?),
    })
  }
}

impl std::fmt::Debug for MemcachedAdapter {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("MemcachedAdapter").finish_non_exhaustive()
  }
}

impl CacheAdapter for MemcachedAdapter {
  fn backend(&self) -> &'static str {
    "memcached"
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
    // Memcached evicts expired items natively.
    Ok(0)
  }
}

/// The async twin of [`MemcachedAdapter`].
pub struct AsyncMemcachedAdapter {
  store: Arc<MemcachedStore>,
}

impl AsyncMemcachedAdapter {
  /// Connects to the configured server.
  pub fn open(config: &CacheConfig) -> CacheResult<Self> {
    Ok(Self {
      store: Arc::new(MemcachedStore::connect(config)?),
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
    .map_err(|e| CacheError::unavailable("memcached", e))?
}

#[async_trait]
impl AsyncCacheAdapter for AsyncMemcachedAdapter {
  fn backend(&self) -> &'static str {
    "memcached"
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
    Ok(0)
  }
}
