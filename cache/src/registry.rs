//! The closed set of adapters and their aliases.
//!
//! Aliases are resolved at configuration time into [`AdapterKind`] variants,
//! so backend selection is checked by the compiler instead of living as
//! free-form string dispatch. Parsing an alias is side-effect-free; only
//! [`AdapterKind::open_sync`] / [`AdapterKind::open_async`] establish a
//! connection.

use crate::adapter::CacheAdapter;
use crate::adapter_async::AsyncCacheAdapter;
use crate::backend;
use crate::config::CacheConfig;
use crate::error::{CacheError, CacheResult};

use std::fmt;
use std::str::FromStr;

/// One variant per compiled-in backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterKind {
  Memory,
  #[cfg(feature = "sqlite")]
  Sqlite,
  #[cfg(feature = "redis")]
  Redis,
  #[cfg(feature = "memcached")]
  Memcached,
}

impl AdapterKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      AdapterKind::Memory => "memory",
      #[cfg(feature = "sqlite")]
      AdapterKind::Sqlite => "sqlite",
      #[cfg(feature = "redis")]
      AdapterKind::Redis => "redis",
      #[cfg(feature = "memcached")]
      AdapterKind::Memcached => "memcached",
    }
  }

  /// Opens a synchronous adapter against this backend.
  pub fn open_sync(&self, config: &CacheConfig) -> CacheResult<Box<dyn CacheAdapter>> {
    match self {
      AdapterKind::Memory => Ok(Box::new(backend::MemoryAdapter::new(config))),
      #[cfg(feature = "sqlite")]
      AdapterKind::Sqlite => Ok(Box::new(backend::SqliteAdapter::open(config)?)),
      #[cfg(feature = "redis")]
      AdapterKind::Redis => Ok(Box::new(backend::RedisAdapter::open(config)?)),
      #[cfg(feature = "memcached")]
      AdapterKind::Memcached => Ok(Box::new(backend::MemcachedAdapter::open(config)?)),
    }
  }

  /// Opens an asynchronous adapter against this backend.
  pub async fn open_async(&self, config: &CacheConfig) -> CacheResult<Box<dyn AsyncCacheAdapter>> {
    match self {
      AdapterKind::Memory => Ok(Box::new(backend::AsyncMemoryAdapter::new(config))),
      #[cfg(feature = "sqlite")]
      AdapterKind::Sqlite => Ok(Box::new(backend::AsyncSqliteAdapter::open(config)?)),
      #[cfg(feature = "redis")]
      AdapterKind::Redis => Ok(Box::new(backend::AsyncRedisAdapter::open(config).await?)),
      #[cfg(feature = "memcached")]
      AdapterKind::Memcached => Ok(Box::new(backend::AsyncMemcachedAdapter::open(config)?)),
    }
  }
}

impl fmt::Display for AdapterKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for AdapterKind {
  type Err = CacheError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "memory" | "ram" => Ok(AdapterKind::Memory),
      "sqlite" => {
        #[cfg(feature = "sqlite")]
        {
          Ok(AdapterKind::Sqlite)
        }
        #[cfg(not(feature = "sqlite"))]
        {
          Err(CacheError::BackendDisabled {
            alias: "sqlite".to_string(),
          })
        }
      }
      "redis" => {
        #[cfg(feature = "redis")]
        {
          Ok(AdapterKind::Redis)
        }
        #[cfg(not(feature = "redis"))]
        {
          Err(CacheError::BackendDisabled {
            alias: "redis".to_string(),
          })
        }
      }
      "memcached" | "memcache" => {
        #[cfg(feature = "memcached")]
        {
          Ok(AdapterKind::Memcached)
        }
        #[cfg(not(feature = "memcached"))]
        {
          Err(CacheError::BackendDisabled {
            alias: "memcached".to_string(),
          })
        }
      }
      other => Err(CacheError::UnknownBackend {
        alias: other.to_string(),
      }),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn aliases_resolve_case_insensitively() {
    assert_eq!("memory".parse::<AdapterKind>().unwrap(), AdapterKind::Memory);
    assert_eq!("RAM".parse::<AdapterKind>().unwrap(), AdapterKind::Memory);
  }

  #[test]
  fn unknown_alias_is_a_distinct_error() {
    let err = "mongodb".parse::<AdapterKind>().unwrap_err();
    assert!(matches!(err, CacheError::UnknownBackend { .. }));
  }

  #[cfg(feature = "sqlite")]
  #[test]
  fn sqlite_alias_resolves_when_compiled_in() {
    assert_eq!("sqlite".parse::<AdapterKind>().unwrap(), AdapterKind::Sqlite);
  }
}
