//! Process-local adapters backed by a plain map.
//!
//! Expiry is checked lazily on every access, and a background sweeper
//! removes expired entries periodically. The sweeper holds only a `Weak`
//! reference to the store, so it winds down on its own once the last
//! adapter handle is dropped.

use crate::adapter::CacheAdapter;
use crate::adapter_async::AsyncCacheAdapter;
use crate::config::CacheConfig;
use crate::error::{CacheError, CacheResult};

use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};

use ahash::{HashMap, HashMapExt};
use async_trait::async_trait;
use tracing::debug;

#[derive(Debug, Clone)]
struct StoredEntry {
  value: Vec<u8>,
  expires_at: Option<Instant>,
}

impl StoredEntry {
  fn is_expired(&self, now: Instant) -> bool {
    matches!(self.expires_at, Some(at) if at <= now)
  }
}

fn expiry_from(timeout: Option<Duration>) -> Option<Instant> {
  timeout.map(|d| Instant::now() + d)
}

fn sweep(map: &mut HashMap<String, StoredEntry>) -> u64 {
  let now = Instant::now();
  let before = map.len();
  map.retain(|_, entry| !entry.is_expired(now));
  (before - map.len()) as u64
}

// ---------------------------------------------------------------------------
// Synchronous adapter
// ---------------------------------------------------------------------------

struct MemoryShared {
  map: parking_lot::RwLock<HashMap<String, StoredEntry>>,
}

/// A thread-safe, process-local cache adapter. No I/O, no serialization
/// round-trips beyond the shared envelope, no operation timeouts.
pub struct MemoryAdapter {
  shared: Arc<MemoryShared>,
  default_timeout: Option<Duration>,
}

impl MemoryAdapter {
  pub fn new(config: &CacheConfig) -> Self {
    let shared = Arc::new(MemoryShared {
      map: parking_lot::RwLock::new(HashMap::new()),
    });
    spawn_sweeper(Arc::downgrade(&shared), config.purge_every);
    Self {
      shared,
      default_timeout: config.default_timeout,
    }
  }
}

impl Default for MemoryAdapter {
  fn default() -> Self {
    Self::new(&CacheConfig::default())
  }
}

/// Periodic sweep on a dedicated thread, in addition to the lazy checks on
/// access. Exits once the store is gone.
fn spawn_sweeper(shared: Weak<MemoryShared>, every: Duration) {
  thread::Builder::new()
    .name("hoard-cache-sweeper".to_string())
    .spawn(move || loop {
      thread::sleep(every);
      let Some(shared) = shared.upgrade() else {
        break;
      };
      let dropped = sweep(&mut shared.map.write());
      if dropped > 0 {
        debug!(dropped, "memory sweep removed expired entries");
      }
    })
    .ok();
}

impl CacheAdapter for MemoryAdapter {
  fn backend(&self) -> &'static str {
    "memory"
  }

  fn default_timeout(&self) -> Option<Duration> {
    self.default_timeout
  }

  fn get_raw(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
    let now = Instant::now();
    // Fast path: read lock only.
    {
      let map = self.shared.map.read();
      match map.get(key) {
        None => return Ok(None),
        Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
        Some(_) => {}
      }
    }
    // Expired entry found: drop it under the write lock.
    let mut map = self.shared.map.write();
    if map.get(key).is_some_and(|e| e.is_expired(now)) {
      map.remove(key);
    }
    Ok(None)
  }

  fn set_raw(&self, key: &str, value: Vec<u8>, timeout: Option<Duration>) -> CacheResult<()> {
    let entry = StoredEntry {
      value,
      expires_at: expiry_from(timeout),
    };
    self.shared.map.write().insert(key.to_string(), entry);
    Ok(())
  }

  fn remove(&self, keys: &[&str]) -> CacheResult<bool> {
    let now = Instant::now();
    let mut map = self.shared.map.write();
    let mut removed = false;
    for key in keys {
      if let Some(entry) = map.remove(*key) {
        // An expired entry counts as already absent.
        removed |= !entry.is_expired(now);
      }
    }
    Ok(removed)
  }

  fn update_timeout_raw(&self, key: &str, timeout: Option<Duration>) -> CacheResult<Vec<u8>> {
    let now = Instant::now();
    let mut map = self.shared.map.write();
    match map.get_mut(key) {
      Some(entry) if !entry.is_expired(now) => {
        entry.expires_at = expiry_from(timeout);
        Ok(entry.value.clone())
      }
      _ => Err(CacheError::Miss {
        key: key.to_string(),
      }),
    }
  }

  fn purge(&self) -> CacheResult<u64> {
    Ok(sweep(&mut self.shared.map.write()))
  }

  fn close(&self) -> CacheResult<()> {
    self.shared.map.write().clear();
    Ok(())
  }
}

// ---------------------------------------------------------------------------
// Asynchronous adapter
// ---------------------------------------------------------------------------

struct AsyncMemoryShared {
  map: tokio::sync::RwLock<HashMap<String, StoredEntry>>,
}

/// The async twin of [`MemoryAdapter`], guarding its map with the runtime's
/// own lock so waiters suspend instead of blocking a worker thread.
pub struct AsyncMemoryAdapter {
  shared: Arc<AsyncMemoryShared>,
  default_timeout: Option<Duration>,
}

impl AsyncMemoryAdapter {
  /// Creates the adapter. When called inside a Tokio runtime a periodic
  /// sweeper task is spawned alongside; outside one, expiry still works
  /// through the lazy checks on access.
  pub fn new(config: &CacheConfig) -> Self {
    let shared = Arc::new(AsyncMemoryShared {
      map: tokio::sync::RwLock::new(HashMap::new()),
    });
    if let Ok(handle) = tokio::runtime::Handle::try_current() {
      handle.spawn(sweeper_task(Arc::downgrade(&shared), config.purge_every));
    }
    Self {
      shared,
      default_timeout: config.default_timeout,
    }
  }
}

impl Default for AsyncMemoryAdapter {
  fn default() -> Self {
    Self::new(&CacheConfig::default())
  }
}

async fn sweeper_task(shared: Weak<AsyncMemoryShared>, every: Duration) {
  let mut tick = tokio::time::interval(every);
  tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
  loop {
    tick.tick().await;
    let Some(shared) = shared.upgrade() else {
      break;
    };
    let dropped = sweep(&mut *shared.map.write().await);
    if dropped > 0 {
      debug!(dropped, "memory sweep removed expired entries");
    }
  }
}

#[async_trait]
impl AsyncCacheAdapter for AsyncMemoryAdapter {
  fn backend(&self) -> &'static str {
    "memory"
  }

  fn default_timeout(&self) -> Option<Duration> {
    self.default_timeout
  }

  async fn get_raw(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
    let now = Instant::now();
    {
      let map = self.shared.map.read().await;
      match map.get(key) {
        None => return Ok(None),
        Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
        Some(_) => {}
      }
    }
    let mut map = self.shared.map.write().await;
    if map.get(key).is_some_and(|e| e.is_expired(now)) {
      map.remove(key);
    }
    Ok(None)
  }

  async fn set_raw(&self, key: &str, value: Vec<u8>, timeout: Option<Duration>) -> CacheResult<()> {
    let entry = StoredEntry {
      value,
      expires_at: expiry_from(timeout),
    };
    self.shared.map.write().await.insert(key.to_string(), entry);
    Ok(())
  }

  async fn remove(&self, keys: &[&str]) -> CacheResult<bool> {
    let now = Instant::now();
    let mut map = self.shared.map.write().await;
    let mut removed = false;
    for key in keys {
      if let Some(entry) = map.remove(*key) {
        removed |= !entry.is_expired(now);
      }
    }
    Ok(removed)
  }

  async fn update_timeout_raw(&self, key: &str, timeout: Option<Duration>) -> CacheResult<Vec<u8>> {
    let now = Instant::now();
    let mut map = self.shared.map.write().await;
    match map.get_mut(key) {
      Some(entry) if !entry.is_expired(now) => {
        entry.expires_at = expiry_from(timeout);
        Ok(entry.value.clone())
      }
      _ => Err(CacheError::Miss {
        key: key.to_string(),
      }),
    }
  }

  async fn purge(&self) -> CacheResult<u64> {
    Ok(sweep(&mut *self.shared.map.write().await))
  }

  async fn close(&self) -> CacheResult<()> {
    self.shared.map.write().await.clear();
    Ok(())
  }
}
