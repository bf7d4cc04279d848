//! The asynchronous adapter contract.
//!
//! A deliberate mirror of [`crate::adapter`], not a unification: the async
//! stack is a parallel implementation of the same conceptual contract,
//! using the concurrency primitives native to a cooperative runtime.
//! Behavior parity between the two stacks is exercised by the mirrored
//! integration test suites.

use crate::adapter::Ttl;
use crate::codec;
use crate::error::{CacheError, CacheResult};

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// The raw, object-safe contract implemented by every asynchronous backend.
///
/// Every method that touches the network or the filesystem is a suspension
/// point; blocking client libraries are offloaded to the runtime's blocking
/// pool by their adapters rather than stalling the executor.
#[async_trait]
pub trait AsyncCacheAdapter: Send + Sync {
  /// Short name of the backing store, used in errors and logs.
  fn backend(&self) -> &'static str;

  /// The lifetime applied when an operation resolves [`Ttl::Default`].
  fn default_timeout(&self) -> Option<Duration>;

  /// Returns the stored envelope bytes for `key`, or `None` when the key
  /// is absent or expired.
  async fn get_raw(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

  /// Stores `value` under `key`. `timeout: None` means the entry never
  /// expires. Overwrites silently.
  async fn set_raw(&self, key: &str, value: Vec<u8>, timeout: Option<Duration>) -> CacheResult<()>;

  /// Removes the given keys. Returns `true` if at least one live entry was
  /// removed; removing absent keys is not an error.
  async fn remove(&self, keys: &[&str]) -> CacheResult<bool>;

  /// Replaces the expiry of a live entry without touching its value, and
  /// returns the stored bytes. Fails with [`CacheError::Miss`] when the key
  /// is absent or already expired.
  async fn update_timeout_raw(&self, key: &str, timeout: Option<Duration>) -> CacheResult<Vec<u8>>;

  /// Sweeps expired entries, returning how many were dropped.
  async fn purge(&self) -> CacheResult<u64>;

  /// Releases backend resources early.
  async fn close(&self) -> CacheResult<()> {
    Ok(())
  }
}

/// Typed operations over any [`AsyncCacheAdapter`].
#[async_trait]
pub trait AsyncCacheAdapterExt: AsyncCacheAdapter {
  /// Returns the value under `key`, or `Ok(None)` when absent or expired.
  async fn get<T>(&self, key: &str) -> CacheResult<Option<T>>
  where
    T: DeserializeOwned + Send,
  {
    match self.get_raw(key).await? {
      Some(bytes) => Ok(Some(codec::decode(&bytes)?)),
      None => Ok(None),
    }
  }

  /// Like [`get`](Self::get), but returns `default` on a miss.
  async fn get_or<T>(&self, key: &str, default: T) -> CacheResult<T>
  where
    T: DeserializeOwned + Send,
  {
    Ok(self.get(key).await?.unwrap_or(default))
  }

  /// Strict lookup: a miss is an error instead of `None`.
  async fn try_get<T>(&self, key: &str) -> CacheResult<T>
  where
    T: DeserializeOwned + Send,
  {
    self.get(key).await?.ok_or_else(|| CacheError::Miss {
      key: key.to_string(),
    })
  }

  /// Stores `value` under `key` with the requested lifetime.
  async fn set<T>(&self, key: &str, value: &T, ttl: Ttl) -> CacheResult<()>
  where
    T: Serialize + Sync + ?Sized,
  {
    let bytes = codec::encode(value)?;
    self
      .set_raw(key, bytes, ttl.resolve(self.default_timeout()))
      .await
  }

  /// Replaces the expiry of a live entry and returns its value.
  async fn update_timeout<T>(&self, key: &str, ttl: Ttl) -> CacheResult<T>
  where
    T: DeserializeOwned + Send,
  {
    let bytes = self
      .update_timeout_raw(key, ttl.resolve(self.default_timeout()))
      .await?;
    codec::decode(&bytes)
  }

  /// Returns the value under `key`, storing and returning `value` when the
  /// key is absent or expired.
  async fn get_or_set<T>(&self, key: &str, value: T, ttl: Ttl) -> CacheResult<T>
  where
    T: Serialize + DeserializeOwned + Send + Sync,
  {
    if let Some(found) = self.get(key).await? {
      return Ok(found);
    }
    self.set(key, &value, ttl).await?;
    Ok(value)
  }

  /// Like [`get_or_set`](Self::get_or_set), but awaits the computation only
  /// on a miss.
  ///
  /// Two concurrent callers can both miss and both compute; the last write
  /// wins. This layer deliberately adds no cross-caller locking.
  async fn get_or_set_with<T, F, Fut>(&self, key: &str, make: F, ttl: Ttl) -> CacheResult<T>
  where
    T: Serialize + DeserializeOwned + Send + Sync,
    F: FnOnce() -> Fut + Send,
    Fut: Future<Output = T> + Send,
  {
    if let Some(found) = self.get(key).await? {
      return Ok(found);
    }
    let value = make().await;
    self.set(key, &value, ttl).await?;
    Ok(value)
  }
}

impl<A: AsyncCacheAdapter + ?Sized> AsyncCacheAdapterExt for A {}
