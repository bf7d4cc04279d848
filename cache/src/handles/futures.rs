use crate::adapter::Ttl;
use crate::adapter_async::{AsyncCacheAdapter, AsyncCacheAdapterExt};
use crate::config::CacheConfig;
use crate::error::CacheResult;
use crate::registry::AdapterKind;

use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// An asynchronous cache facade.
///
/// The async twin of [`Cache`](crate::handles::sync::Cache), with its own
/// active-adapter slot: swapping the sync facade's adapter never affects
/// this one. The slot lock is held only long enough to clone the adapter
/// handle, never across a suspension point.
pub struct AsyncCache {
  adapter: RwLock<Arc<dyn AsyncCacheAdapter>>,
}

impl AsyncCache {
  /// A facade over a fresh async memory adapter with default settings.
  pub fn new() -> Self {
    Self::with_adapter(crate::backend::AsyncMemoryAdapter::default())
  }

  /// A facade over the given adapter.
  pub fn with_adapter<A: AsyncCacheAdapter + 'static>(adapter: A) -> Self {
    Self {
      adapter: RwLock::new(Arc::new(adapter)),
    }
  }

  /// Opens the given backend and wraps it.
  pub async fn open(kind: AdapterKind, config: &CacheConfig) -> CacheResult<Self> {
    Ok(Self {
      adapter: RwLock::new(Arc::from(kind.open_async(config).await?)),
    })
  }

  /// Opens the backend named by `config.adapter_async` and wraps it.
  pub async fn from_config(config: &CacheConfig) -> CacheResult<Self> {
    let kind: AdapterKind = config.adapter_async.parse()?;
    Self::open(kind, config).await
  }

  /// Replaces the active adapter, returning the previous one.
  pub fn adapter_set(&self, adapter: Arc<dyn AsyncCacheAdapter>) -> Arc<dyn AsyncCacheAdapter> {
    std::mem::replace(&mut *self.adapter.write(), adapter)
  }

  /// A handle to the currently active adapter.
  pub fn adapter(&self) -> Arc<dyn AsyncCacheAdapter> {
    self.adapter.read().clone()
  }

  /// Name of the active adapter's backing store.
  pub fn backend(&self) -> &'static str {
    self.adapter().backend()
  }

  pub async fn get<T>(&self, key: &str) -> CacheResult<Option<T>>
  where
    T: DeserializeOwned + Send,
  {
    self.adapter().get(key).await
  }

  pub async fn get_or<T>(&self, key: &str, default: T) -> CacheResult<T>
  where
    T: DeserializeOwned + Send,
  {
    self.adapter().get_or(key, default).await
  }

  pub async fn try_get<T>(&self, key: &str) -> CacheResult<T>
  where
    T: DeserializeOwned + Send,
  {
    self.adapter().try_get(key).await
  }

  pub async fn set<T>(&self, key: &str, value: &T, ttl: Ttl) -> CacheResult<()>
  where
    T: Serialize + Sync + ?Sized,
  {
    self.adapter().set(key, value, ttl).await
  }

  pub async fn remove(&self, keys: &[&str]) -> CacheResult<bool> {
    self.adapter().remove(keys).await
  }

  pub async fn update_timeout<T>(&self, key: &str, ttl: Ttl) -> CacheResult<T>
  where
    T: DeserializeOwned + Send,
  {
    self.adapter().update_timeout(key, ttl).await
  }

  pub async fn get_or_set<T>(&self, key: &str, value: T, ttl: Ttl) -> CacheResult<T>
  where
    T: Serialize + DeserializeOwned + Send + Sync,
  {
    self.adapter().get_or_set(key, value, ttl).await
  }

  pub async fn get_or_set_with<T, F, Fut>(&self, key: &str, make: F, ttl: Ttl) -> CacheResult<T>
  where
    T: Serialize + DeserializeOwned + Send + Sync,
    F: FnOnce() -> Fut + Send,
    Fut: Future<Output = T> + Send,
  {
    self.adapter().get_or_set_with(key, make, ttl).await
  }

  pub async fn purge(&self) -> CacheResult<u64> {
    self.adapter().purge().await
  }

  pub async fn close(&self) -> CacheResult<()> {
    self.adapter().close().await
  }
}

impl Default for AsyncCache {
  fn default() -> Self {
    Self::new()
  }
}

impl std::fmt::Debug for AsyncCache {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AsyncCache")
      .field("backend", &self.backend())
      .finish()
  }
}
