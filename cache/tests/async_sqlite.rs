#![cfg(feature = "sqlite")]

mod common;

use common::{sqlite_config, SLEEP_MARGIN, TINY_TTL};
use hoard_cache::backend::AsyncSqliteAdapter;
use hoard_cache::{AsyncCacheAdapter, AsyncCacheAdapterExt, CacheError, Ttl};

use std::time::Duration;
use tokio::time::sleep;

#[tokio::test]
async fn test_async_sqlite_round_trip() {
  let cache = AsyncSqliteAdapter::open(&sqlite_config("async-roundtrip")).unwrap();

  cache.set("str", "hello", Ttl::Default).await.unwrap();
  cache.set("int", &-42i64, Ttl::Default).await.unwrap();

  assert_eq!(
    cache.get::<String>("str").await.unwrap(),
    Some("hello".to_string())
  );
  assert_eq!(cache.get::<i64>("int").await.unwrap(), Some(-42));
}

#[tokio::test]
async fn test_async_sqlite_expiry() {
  let cache = AsyncSqliteAdapter::open(&sqlite_config("async-expiry")).unwrap();
  cache.set("key", "value", Ttl::After(TINY_TTL)).await.unwrap();

  sleep(TINY_TTL + SLEEP_MARGIN).await;
  assert_eq!(cache.get::<String>("key").await.unwrap(), None);
}

#[tokio::test]
async fn test_async_sqlite_update_timeout() {
  let cache = AsyncSqliteAdapter::open(&sqlite_config("async-touch")).unwrap();
  cache.set("key", "value", Ttl::After(TINY_TTL)).await.unwrap();

  let value: String = cache
    .update_timeout("key", Ttl::After(Duration::from_secs(10)))
    .await
    .unwrap();
  assert_eq!(value, "value");

  sleep(TINY_TTL + SLEEP_MARGIN).await;
  assert!(cache.get::<String>("key").await.unwrap().is_some());

  let err = cache
    .update_timeout::<String>("nonexistent", Ttl::Default)
    .await
    .unwrap_err();
  assert!(matches!(err, CacheError::Miss { .. }));
}

#[tokio::test]
async fn test_async_sqlite_remove_and_sweep() {
  let cache = AsyncSqliteAdapter::open(&sqlite_config("async-remove")).unwrap();
  cache.set("a", &1u32, Ttl::Default).await.unwrap();
  cache.set("short", &2u32, Ttl::After(TINY_TTL)).await.unwrap();

  assert!(cache.remove(&["a"]).await.unwrap());
  assert!(!cache.remove(&["a"]).await.unwrap());

  sleep(TINY_TTL + SLEEP_MARGIN).await;
  assert_eq!(cache.purge().await.unwrap(), 1);
}

#[tokio::test]
async fn test_async_sqlite_get_or_set_with() {
  let cache = AsyncSqliteAdapter::open(&sqlite_config("async-getorset")).unwrap();

  let computed = cache
    .get_or_set_with("lazy", || async { "computed".to_string() }, Ttl::Default)
    .await
    .unwrap();
  assert_eq!(computed, "computed");

  let cached = cache
    .get_or_set_with("lazy", || async { "fresh".to_string() }, Ttl::Default)
    .await
    .unwrap();
  assert_eq!(cached, "computed");
}
