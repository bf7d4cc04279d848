mod common;

use common::{SLEEP_MARGIN, TINY_TTL};
use hoard_cache::backend::AsyncMemoryAdapter;
use hoard_cache::{AsyncCacheAdapter, AsyncCacheAdapterExt, Ttl};

use std::time::Duration;
use tokio::time::sleep;

#[tokio::test]
async fn test_async_entry_expires_after_ttl() {
  let cache = AsyncMemoryAdapter::default();
  cache.set("key", "value", Ttl::After(TINY_TTL)).await.unwrap();
  assert!(cache.get::<String>("key").await.unwrap().is_some());

  sleep(TINY_TTL + SLEEP_MARGIN).await;
  assert_eq!(cache.get::<String>("key").await.unwrap(), None);
  assert!(cache.try_get::<String>("key").await.unwrap_err().is_miss());
}

#[tokio::test]
async fn test_async_never_expire() {
  let cache = AsyncMemoryAdapter::default();
  cache.set("key", "value", Ttl::Never).await.unwrap();
  sleep(TINY_TTL + SLEEP_MARGIN).await;
  assert!(cache.get::<String>("key").await.unwrap().is_some());
}

#[tokio::test]
async fn test_async_update_timeout_extends_life() {
  let cache = AsyncMemoryAdapter::default();
  cache.set("key", "value", Ttl::After(TINY_TTL)).await.unwrap();

  let value: String = cache
    .update_timeout("key", Ttl::After(Duration::from_secs(10)))
    .await
    .unwrap();
  assert_eq!(value, "value");

  sleep(TINY_TTL + SLEEP_MARGIN).await;
  assert_eq!(
    cache.get::<String>("key").await.unwrap(),
    Some("value".to_string())
  );
}

#[tokio::test]
async fn test_async_update_timeout_on_missing_key_is_a_miss() {
  let cache = AsyncMemoryAdapter::default();
  let err = cache
    .update_timeout::<String>("nonexistent", Ttl::After(Duration::from_secs(10)))
    .await
    .unwrap_err();
  assert!(err.is_miss());
}

#[tokio::test]
async fn test_async_purge_sweeps_expired_entries() {
  let cache = AsyncMemoryAdapter::default();
  cache.set("short", &1u32, Ttl::After(TINY_TTL)).await.unwrap();
  cache.set("long", &2u32, Ttl::Never).await.unwrap();

  sleep(TINY_TTL + SLEEP_MARGIN).await;
  assert_eq!(cache.purge().await.unwrap(), 1);
  assert_eq!(cache.purge().await.unwrap(), 0);
  assert_eq!(cache.get::<u32>("long").await.unwrap(), Some(2));
}

#[tokio::test]
async fn test_async_background_sweeper_drops_expired_entries() {
  let config = hoard_cache::CacheConfig::default().purge_every(Duration::from_millis(50));
  let cache = AsyncMemoryAdapter::new(&config);
  cache.set("key", &1u32, Ttl::After(TINY_TTL)).await.unwrap();

  sleep(TINY_TTL + SLEEP_MARGIN + SLEEP_MARGIN).await;
  // The sweeper ran at least once by now; a manual purge finds nothing left.
  assert_eq!(cache.purge().await.unwrap(), 0);
}
