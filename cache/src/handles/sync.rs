use crate::adapter::{CacheAdapter, CacheAdapterExt, Ttl};
use crate::config::CacheConfig;
use crate::error::CacheResult;
use crate::registry::AdapterKind;

use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A synchronous cache facade.
///
/// Wraps the active [`CacheAdapter`] and forwards calls to it. The adapter
/// can be swapped at any time with [`adapter_set`](Cache::adapter_set);
/// entries in the previous adapter are neither migrated nor flushed, and
/// swaps are not synchronized against in-flight calls on other threads.
pub struct Cache {
  adapter: RwLock<Arc<dyn CacheAdapter>>,
}

impl Cache {
  /// A facade over a fresh memory adapter with default settings.
  pub fn new() -> Self {
    Self::with_adapter(crate::backend::MemoryAdapter::default())
  }

  /// A facade over the given adapter.
  pub fn with_adapter<A: CacheAdapter + 'static>(adapter: A) -> Self {
    Self {
      adapter: RwLock::new(Arc::new(adapter)),
    }
  }

  /// Opens the given backend and wraps it.
  pub fn open(kind: AdapterKind, config: &CacheConfig) -> CacheResult<Self> {
    Ok(Self {
      adapter: RwLock::new(Arc::from(kind.open_sync(config)?)),
    })
  }

  /// Opens the backend named by `config.adapter` and wraps it.
  pub fn from_config(config: &CacheConfig) -> CacheResult<Self> {
    let kind: AdapterKind = config.adapter.parse()?;
    Self::open(kind, config)
  }

  /// Replaces the active adapter, returning the previous one.
  pub fn adapter_set(&self, adapter: Arc<dyn CacheAdapter>) -> Arc<dyn CacheAdapter> {
    std::mem::replace(&mut *self.adapter.write(), adapter)
  }

  /// A handle to the currently active adapter.
  pub fn adapter(&self) -> Arc<dyn CacheAdapter> {
    self.adapter.read().clone()
  }

  /// Name of the active adapter's backing store.
  pub fn backend(&self) -> &'static str {
    self.adapter().backend()
  }

  pub fn get<T>(&self, key: &str) -> CacheResult<Option<T>>
  where
    T: DeserializeOwned,
  {
    self.adapter().get(key)
  }

  pub fn get_or<T>(&self, key: &str, default: T) -> CacheResult<T>
  where
    T: DeserializeOwned,
  {
    self.adapter().get_or(key, default)
  }

  pub fn try_get<T>(&self, key: &str) -> CacheResult<T>
  where
    T: DeserializeOwned,
  {
    self.adapter().try_get(key)
  }

  pub fn set<T>(&self, key: &str, value: &T, ttl: Ttl) -> CacheResult<()>
  where
    T: Serialize + ?Sized,
  {
    self.adapter().set(key, value, ttl)
  }

  pub fn remove(&self, keys: &[&str]) -> CacheResult<bool> {
    self.adapter().remove(keys)
  }

  pub fn update_timeout<T>(&self, key: &str, ttl: Ttl) -> CacheResult<T>
  where
    T: DeserializeOwned,
  {
    self.adapter().update_timeout(key, ttl)
  }

  pub fn get_or_set<T>(&self, key: &str, value: T, ttl: Ttl) -> CacheResult<T>
  where
    T: Serialize + DeserializeOwned,
  {
    self.adapter().get_or_set(key, value, ttl)
  }

  pub fn get_or_set_with<T, F>(&self, key: &str, make: F, ttl: Ttl) -> CacheResult<T>
  where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
  {
    self.adapter().get_or_set_with(key, make, ttl)
  }

  pub fn purge(&self) -> CacheResult<u64> {
    self.adapter().purge()
  }

  pub fn close(&self) -> CacheResult<()> {
    self.adapter().close()
  }
}

impl Default for Cache {
  fn default() -> Self {
    Self::new()
  }
}

impl std::fmt::Debug for Cache {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Cache")
      .field("backend", &self.backend())
      .finish()
  }
}
