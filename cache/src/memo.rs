//! Function-result memoization over a cache facade.
//!
//! The Rust rendition of a `@cached` decorator: wrap a call site in a
//! [`Cached`] (or [`AsyncCached`]) and the computed result is stored in the
//! cache under a key derived from the memoizer's name and the call's
//! arguments. The derivation is deterministic across runs and processes:
//! arguments are serialized through the value envelope and hashed with
//! SHA-256, never keyed on identity or addresses.

use crate::adapter::Ttl;
use crate::codec;
use crate::error::CacheResult;
use crate::handles::{AsyncCache, Cache};

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::trace;

/// Derives the cache key for `name` called with `args`:
/// `"<name>:" + first 16 hex chars of sha256(envelope(args))`.
pub fn derive_key<A>(name: &str, args: &A) -> CacheResult<String>
where
  A: Serialize + ?Sized,
{
  let encoded = codec::encode(args)?;
  let digest = Sha256::digest(&encoded);
  let hex = format!("{:x}", digest);
  Ok(format!("{}:{}", name, &hex[..16]))
}

/// Memoizes a synchronous computation into a [`Cache`].
///
/// ```no_run
/// use hoard_cache::{Cache, Cached, Ttl};
/// use std::time::Duration;
///
/// fn lookup(cache: &Cache, user_id: u64) -> hoard_cache::CacheResult<String> {
///   Cached::new(cache, "users:display_name")
///     .ttl(Ttl::After(Duration::from_secs(60)))
///     .call(&user_id, || format!("user-{user_id}"))
/// }
/// ```
pub struct Cached<'c> {
  cache: &'c Cache,
  name: &'c str,
  ttl: Ttl,
  key: Option<String>,
}

impl<'c> Cached<'c> {
  /// A memoizer named `name`; the name namespaces the derived keys, so use
  /// something stable such as the function's qualified path.
  pub fn new(cache: &'c Cache, name: &'c str) -> Self {
    Self {
      cache,
      name,
      ttl: Ttl::Default,
      key: None,
    }
  }

  /// Overrides the lifetime of stored results.
  pub fn ttl(mut self, ttl: Ttl) -> Self {
    self.ttl = ttl;
    self
  }

  /// Overrides the cache key entirely, skipping derivation from arguments.
  pub fn key(mut self, key: impl Into<String>) -> Self {
    self.key = Some(key.into());
    self
  }

  /// Returns the memoized result for `args`, invoking `f` only on a miss.
  ///
  /// Adapter errors propagate unchanged; this layer adds no retries.
  pub fn call<A, T, F>(&self, args: &A, f: F) -> CacheResult<T>
  where
    A: Serialize + ?Sized,
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
  {
    let key = match &self.key {
      Some(key) => key.clone(),
      None => derive_key(self.name, args)?,
    };
    if let Some(hit) = self.cache.get::<T>(&key)? {
      trace!(key = %key, "memoized result served from cache");
      return Ok(hit);
    }
    let value = f();
    self.cache.set(&key, &value, self.ttl)?;
    Ok(value)
  }
}

/// The async twin of [`Cached`], memoizing into an [`AsyncCache`].
pub struct AsyncCached<'c> {
  cache: &'c AsyncCache,
  name: &'c str,
  ttl: Ttl,
  key: Option<String>,
}

impl<'c> AsyncCached<'c> {
  /// A memoizer named `name`; the name namespaces the derived keys.
  pub fn new(cache: &'c AsyncCache, name: &'c str) -> Self {
    Self {
      cache,
      name,
      ttl: Ttl::Default,
      key: None,
    }
  }

  /// Overrides the lifetime of stored results.
  pub fn ttl(mut self, ttl: Ttl) -> Self {
    self.ttl = ttl;
    self
  }

  /// Overrides the cache key entirely, skipping derivation from arguments.
  pub fn key(mut self, key: impl Into<String>) -> Self {
    self.key = Some(key.into());
    self
  }

  /// Returns the memoized result for `args`, awaiting `f` only on a miss.
  pub async fn call<A, T, F, Fut>(&self, args: &A, f: F) -> CacheResult<T>
  where
    A: Serialize + ?Sized,
    T: Serialize + DeserializeOwned + Send + Sync,
    F: FnOnce() -> Fut + Send,
    Fut: Future<Output = T> + Send,
  {
    let key = match &self.key {
      Some(key) => key.clone(),
      None => derive_key(self.name, args)?,
    };
    if let Some(hit) = self.cache.get::<T>(&key).await? {
      trace!(key = %key, "memoized result served from cache");
      return Ok(hit);
    }
    let value = f().await;
    self.cache.set(&key, &value, self.ttl).await?;
    Ok(value)
  }
}
