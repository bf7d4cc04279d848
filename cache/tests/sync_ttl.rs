mod common;

use common::{SLEEP_MARGIN, TINY_TTL};
use hoard_cache::backend::MemoryAdapter;
use hoard_cache::{CacheAdapter, CacheAdapterExt, CacheError, Ttl};

use std::thread;
use std::time::Duration;

#[test]
fn test_entry_expires_after_ttl() {
  let cache = MemoryAdapter::default();
  cache.set("key", "value", Ttl::After(TINY_TTL)).unwrap();
  assert!(cache.get::<String>("key").unwrap().is_some());

  thread::sleep(TINY_TTL + SLEEP_MARGIN);
  assert_eq!(cache.get::<String>("key").unwrap(), None);
  assert_eq!(
    cache.get_or("key", "missing".to_string()).unwrap(),
    "missing"
  );
  assert!(cache.try_get::<String>("key").unwrap_err().is_miss());
}

#[test]
fn test_never_expire() {
  let cache = MemoryAdapter::default();
  cache.set("key", "value", Ttl::Never).unwrap();
  thread::sleep(TINY_TTL + SLEEP_MARGIN);
  assert!(cache.get::<String>("key").unwrap().is_some());
}

#[test]
fn test_update_timeout_extends_life_without_touching_value() {
  let cache = MemoryAdapter::default();
  cache.set("key", "value", Ttl::After(TINY_TTL)).unwrap();

  let value: String = cache
    .update_timeout("key", Ttl::After(Duration::from_secs(10)))
    .unwrap();
  assert_eq!(value, "value");

  // Well past the original timeout, the entry must still be alive.
  thread::sleep(TINY_TTL + SLEEP_MARGIN);
  assert_eq!(
    cache.get::<String>("key").unwrap(),
    Some("value".to_string())
  );
}

#[test]
fn test_update_timeout_on_missing_key_is_a_miss() {
  let cache = MemoryAdapter::default();
  let err = cache
    .update_timeout::<String>("nonexistent", Ttl::After(Duration::from_secs(10)))
    .unwrap_err();
  assert!(matches!(err, CacheError::Miss { key } if key == "nonexistent"));
}

#[test]
fn test_update_timeout_on_expired_key_is_a_miss() {
  let cache = MemoryAdapter::default();
  cache.set("key", "value", Ttl::After(TINY_TTL)).unwrap();
  thread::sleep(TINY_TTL + SLEEP_MARGIN);

  let err = cache
    .update_timeout::<String>("key", Ttl::After(Duration::from_secs(10)))
    .unwrap_err();
  assert!(err.is_miss());
}

#[test]
fn test_purge_sweeps_only_expired_entries() {
  let cache = MemoryAdapter::default();
  cache.set("short", &1u32, Ttl::After(TINY_TTL)).unwrap();
  cache.set("long", &2u32, Ttl::Never).unwrap();

  thread::sleep(TINY_TTL + SLEEP_MARGIN);
  assert_eq!(cache.purge().unwrap(), 1);
  assert_eq!(cache.purge().unwrap(), 0, "purge must be idempotent");
  assert_eq!(cache.get::<u32>("long").unwrap(), Some(2));
}

#[test]
fn test_expired_entry_counts_as_absent_for_remove() {
  let cache = MemoryAdapter::default();
  cache.set("key", &1u32, Ttl::After(TINY_TTL)).unwrap();
  thread::sleep(TINY_TTL + SLEEP_MARGIN);
  assert!(!cache.remove(&["key"]).unwrap());
}
