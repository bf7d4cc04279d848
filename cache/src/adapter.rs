//! The synchronous adapter contract.
//!
//! [`CacheAdapter`] is the object-safe core every backend implements: it
//! moves opaque envelope bytes in and out of the store. [`CacheAdapterExt`]
//! layers the typed API (`get`, `set`, `get_or_set`, ...) on top via a
//! blanket impl, so it is available on concrete adapters and on
//! `dyn CacheAdapter` alike.

use crate::codec;
use crate::error::{CacheError, CacheResult};

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Entry lifetime requested by a store operation.
///
/// This is the single, backend-independent expiry convention: backends never
/// see a `Ttl`, only the resolved `Option<Duration>` where `None` means
/// "never expire".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
  /// Use the adapter's configured default timeout.
  Default,
  /// Keep the entry until it is explicitly removed.
  Never,
  /// Expire this long after the operation.
  After(Duration),
}

impl Ttl {
  /// Resolves against an adapter's configured default.
  pub fn resolve(self, default: Option<Duration>) -> Option<Duration> {
    match self {
      Ttl::Default => default,
      Ttl::Never => None,
      Ttl::After(d) => Some(d),
    }
  }
}

impl From<Duration> for Ttl {
  fn from(d: Duration) -> Self {
    Ttl::After(d)
  }
}

/// The raw, object-safe contract implemented by every synchronous backend.
///
/// Constructors establish the backend connection (or fail with
/// [`CacheError::Unavailable`]); dropping the adapter releases it. Backend
/// connectivity errors are surfaced on every operation, never folded into a
/// miss.
pub trait CacheAdapter: Send + Sync {
  /// Short name of the backing store, used in errors and logs.
  fn backend(&self) -> &'static str;

  /// The lifetime applied when an operation resolves [`Ttl::Default`].
  fn default_timeout(&self) -> Option<Duration>;

  /// Returns the stored envelope bytes for `key`, or `None` when the key
  /// is absent or expired.
  fn get_raw(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

  /// Stores `value` under `key`. `timeout: None` means the entry never
  /// expires. Overwrites silently.
  fn set_raw(&self, key: &str, value: Vec<u8>, timeout: Option<Duration>) -> CacheResult<()>;

  /// Removes the given keys. Returns `true` if at least one live entry was
  /// removed; removing absent keys is not an error.
  fn remove(&self, keys: &[&str]) -> CacheResult<bool>;

  /// Replaces the expiry of a live entry without touching its value, and
  /// returns the stored bytes. Fails with [`CacheError::Miss`] when the key
  /// is absent or already expired.
  fn update_timeout_raw(&self, key: &str, timeout: Option<Duration>) -> CacheResult<Vec<u8>>;

  /// Sweeps expired entries, returning how many were dropped. Backends with
  /// native expiry (Redis, Memcached) have nothing to do and return 0.
  /// Idempotent and safe to call redundantly.
  fn purge(&self) -> CacheResult<u64>;

  /// Releases backend resources early. Dropping the adapter has the same
  /// effect; this exists for callers that want an explicit teardown point.
  fn close(&self) -> CacheResult<()> {
    Ok(())
  }
}

/// Typed operations over any [`CacheAdapter`].
///
/// Values are serialized through the versioned envelope in [`crate::codec`],
/// so the round-trip behavior is identical across backends.
pub trait CacheAdapterExt: CacheAdapter {
  /// Returns the value under `key`, or `Ok(None)` when absent or expired.
  fn get<T>(&self, key: &str) -> CacheResult<Option<T>>
  where
    T: DeserializeOwned,
  {
    match self.get_raw(key)? {
      Some(bytes) => Ok(Some(codec::decode(&bytes)?)),
      None => Ok(None),
    }
  }

  /// Like [`get`](Self::get), but returns `default` on a miss.
  fn get_or<T>(&self, key: &str, default: T) -> CacheResult<T>
  where
    T: DeserializeOwned,
  {
    Ok(self.get(key)?.unwrap_or(default))
  }

  /// Strict lookup: a miss is an error instead of `None`.
  fn try_get<T>(&self, key: &str) -> CacheResult<T>
  where
    T: DeserializeOwned,
  {
    self.get(key)?.ok_or_else(|| CacheError::Miss {
      key: key.to_string(),
    })
  }

  /// Stores `value` under `key` with the requested lifetime.
  fn set<T>(&self, key: &str, value: &T, ttl: Ttl) -> CacheResult<()>
  where
    T: Serialize + ?Sized,
  {
    let bytes = codec::encode(value)?;
    self.set_raw(key, bytes, ttl.resolve(self.default_timeout()))
  }

  /// Replaces the expiry of a live entry and returns its value.
  fn update_timeout<T>(&self, key: &str, ttl: Ttl) -> CacheResult<T>
  where
    T: DeserializeOwned,
  {
    let bytes = self.update_timeout_raw(key, ttl.resolve(self.default_timeout()))?;
    codec::decode(&bytes)
  }

  /// Returns the value under `key`, storing and returning `value` when the
  /// key is absent or expired.
  fn get_or_set<T>(&self, key: &str, value: T, ttl: Ttl) -> CacheResult<T>
  where
    T: Serialize + DeserializeOwned,
  {
    self.get_or_set_with(key, || value, ttl)
  }

  /// Like [`get_or_set`](Self::get_or_set), but computes the value only on
  /// a miss.
  ///
  /// Two concurrent callers can both miss and both compute; the last write
  /// wins. This layer deliberately adds no cross-caller locking.
  fn get_or_set_with<T, F>(&self, key: &str, make: F, ttl: Ttl) -> CacheResult<T>
  where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
  {
    if let Some(found) = self.get(key)? {
      return Ok(found);
    }
    let value = make();
    self.set(key, &value, ttl)?;
    Ok(value)
  }
}

impl<A: CacheAdapter + ?Sized> CacheAdapterExt for A {}
