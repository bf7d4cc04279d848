#![allow(dead_code)]

use hoard_cache::CacheConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub const TINY_TTL: Duration = Duration::from_millis(300);
pub const SLEEP_MARGIN: Duration = Duration::from_millis(250);

static NEXT_DB: AtomicU64 = AtomicU64::new(0);

/// A config pointing at a unique throwaway SQLite database per test.
pub fn sqlite_config(tag: &str) -> CacheConfig {
  let n = NEXT_DB.fetch_add(1, Ordering::Relaxed);
  CacheConfig::default().sqlite_path(
    std::env::temp_dir().join("hoard-cache-tests"),
    format!("{}-{}-{}.sqlite3", tag, std::process::id(), n),
  )
}
