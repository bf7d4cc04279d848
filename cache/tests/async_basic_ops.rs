use hoard_cache::backend::AsyncMemoryAdapter;
use hoard_cache::{AsyncCacheAdapter, AsyncCacheAdapterExt, CacheError, Ttl};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
  name: String,
  logins: u32,
}

#[tokio::test]
async fn test_async_round_trip_common_value_shapes() {
  let cache = AsyncMemoryAdapter::default();

  cache.set("str", "hello world", Ttl::Default).await.unwrap();
  assert_eq!(
    cache.get::<String>("str").await.unwrap(),
    Some("hello world".to_string())
  );

  cache.set("int", &12345i64, Ttl::Default).await.unwrap();
  assert_eq!(cache.get::<i64>("int").await.unwrap(), Some(12345));

  let mut nested = BTreeMap::new();
  nested.insert("name".to_string(), "Ana".to_string());
  cache.set("user:42", &nested, Ttl::Default).await.unwrap();
  assert_eq!(
    cache
      .get::<BTreeMap<String, String>>("user:42")
      .await
      .unwrap(),
    Some(nested)
  );

  let user = User {
    name: "Ana".to_string(),
    logins: 7,
  };
  cache.set("user:obj", &user, Ttl::Default).await.unwrap();
  assert_eq!(cache.get::<User>("user:obj").await.unwrap(), Some(user));
}

#[tokio::test]
async fn test_async_get_miss_returns_none_and_default() {
  let cache = AsyncMemoryAdapter::default();
  assert_eq!(cache.get::<String>("absent").await.unwrap(), None);
  assert_eq!(
    cache.get_or("absent", "fallback".to_string()).await.unwrap(),
    "fallback"
  );
}

#[tokio::test]
async fn test_async_strict_get_miss_is_an_error() {
  let cache = AsyncMemoryAdapter::default();
  let err = cache.try_get::<String>("absent").await.unwrap_err();
  assert!(matches!(err, CacheError::Miss { key } if key == "absent"));
}

#[tokio::test]
async fn test_async_remove_is_idempotent() {
  let cache = AsyncMemoryAdapter::default();
  cache.set("key", &1u32, Ttl::Default).await.unwrap();

  assert!(cache.remove(&["key"]).await.unwrap());
  assert!(!cache.remove(&["key"]).await.unwrap());
}

#[tokio::test]
async fn test_async_remove_reports_any_removed() {
  let cache = AsyncMemoryAdapter::default();
  cache.set("present", &1u32, Ttl::Default).await.unwrap();
  assert!(cache.remove(&["absent", "present"]).await.unwrap());
  assert!(!cache.remove(&["absent", "present"]).await.unwrap());
}

#[tokio::test]
async fn test_async_get_or_set_stores_on_miss_only() {
  let cache = AsyncMemoryAdapter::default();

  let first = cache
    .get_or_set("greeting", "hello".to_string(), Ttl::Default)
    .await
    .unwrap();
  assert_eq!(first, "hello");

  let second = cache
    .get_or_set("greeting", "ignored".to_string(), Ttl::Default)
    .await
    .unwrap();
  assert_eq!(second, "hello");
}

#[tokio::test]
async fn test_async_get_or_set_with_computes_on_miss_only() {
  let cache = AsyncMemoryAdapter::default();

  let computed = cache
    .get_or_set_with("lazy", || async { 42u32 }, Ttl::Default)
    .await
    .unwrap();
  assert_eq!(computed, 42);

  // Second call hits; a fresh computation would return a different value.
  let cached = cache
    .get_or_set_with("lazy", || async { 0u32 }, Ttl::Default)
    .await
    .unwrap();
  assert_eq!(cached, 42);
}

#[tokio::test]
async fn test_async_close_drops_all_entries() {
  let cache = AsyncMemoryAdapter::default();
  cache.set("key", &1u32, Ttl::Default).await.unwrap();
  cache.close().await.unwrap();
  assert_eq!(cache.get::<u32>("key").await.unwrap(), None);
}
