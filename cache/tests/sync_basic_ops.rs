use hoard_cache::backend::MemoryAdapter;
use hoard_cache::{CacheAdapter, CacheAdapterExt, CacheError, Ttl};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
  name: String,
  logins: u32,
}

#[test]
fn test_round_trip_common_value_shapes() {
  let cache = MemoryAdapter::default();

  cache.set("str", "hello world", Ttl::Default).unwrap();
  assert_eq!(
    cache.get::<String>("str").unwrap(),
    Some("hello world".to_string())
  );

  cache.set("int", &12345i64, Ttl::Default).unwrap();
  assert_eq!(cache.get::<i64>("int").unwrap(), Some(12345));

  let mut nested = BTreeMap::new();
  nested.insert("name".to_string(), "Ana".to_string());
  cache.set("user:42", &nested, Ttl::Default).unwrap();
  assert_eq!(
    cache.get::<BTreeMap<String, String>>("user:42").unwrap(),
    Some(nested)
  );

  let user = User {
    name: "Ana".to_string(),
    logins: 7,
  };
  cache.set("user:obj", &user, Ttl::Default).unwrap();
  assert_eq!(cache.get::<User>("user:obj").unwrap(), Some(user));
}

#[test]
fn test_get_miss_returns_none_and_default() {
  let cache = MemoryAdapter::default();
  assert_eq!(cache.get::<String>("absent").unwrap(), None);
  assert_eq!(
    cache.get_or("absent", "fallback".to_string()).unwrap(),
    "fallback"
  );
}

#[test]
fn test_strict_get_miss_is_an_error() {
  let cache = MemoryAdapter::default();
  let err = cache.try_get::<String>("absent").unwrap_err();
  assert!(err.is_miss());
  assert!(matches!(err, CacheError::Miss { key } if key == "absent"));
}

#[test]
fn test_set_overwrites_silently() {
  let cache = MemoryAdapter::default();
  cache.set("key", &1u32, Ttl::Default).unwrap();
  cache.set("key", &2u32, Ttl::Default).unwrap();
  assert_eq!(cache.get::<u32>("key").unwrap(), Some(2));
}

#[test]
fn test_remove_is_idempotent() {
  let cache = MemoryAdapter::default();
  cache.set("key", &1u32, Ttl::Default).unwrap();

  assert!(cache.remove(&["key"]).unwrap());
  assert_eq!(cache.get::<u32>("key").unwrap(), None);
  // Removing again is not an error, just "nothing removed".
  assert!(!cache.remove(&["key"]).unwrap());
}

#[test]
fn test_remove_reports_any_removed() {
  let cache = MemoryAdapter::default();
  cache.set("present", &1u32, Ttl::Default).unwrap();
  // One of two keys exists: still counts as "something was removed".
  assert!(cache.remove(&["absent", "present"]).unwrap());
  assert!(!cache.remove(&["absent", "present"]).unwrap());
}

#[test]
fn test_get_or_set_stores_on_miss_only() {
  let cache = MemoryAdapter::default();

  let first = cache
    .get_or_set("greeting", "hello".to_string(), Ttl::Default)
    .unwrap();
  assert_eq!(first, "hello");

  // Key now exists: the provided value must be ignored.
  let second = cache
    .get_or_set("greeting", "ignored".to_string(), Ttl::Default)
    .unwrap();
  assert_eq!(second, "hello");
}

#[test]
fn test_get_or_set_with_skips_computation_on_hit() {
  let cache = MemoryAdapter::default();
  cache.set("primed", &41u32, Ttl::Default).unwrap();

  let value = cache
    .get_or_set_with(
      "primed",
      || -> u32 { panic!("must not compute on a hit") },
      Ttl::Default,
    )
    .unwrap();
  assert_eq!(value, 41u32);
}

#[test]
fn test_close_drops_all_entries() {
  let cache = MemoryAdapter::default();
  cache.set("key", &1u32, Ttl::Default).unwrap();
  cache.close().unwrap();
  assert_eq!(cache.get::<u32>("key").unwrap(), None);
}
