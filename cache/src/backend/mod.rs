//! Backend adapter implementations.
//!
//! Each submodule provides a synchronous adapter and its asynchronous twin
//! against one backing store. Network-backed stores are feature-gated so
//! their client libraries stay out of builds that do not need them.

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "redis")]
pub mod redis;

#[cfg(feature = "memcached")]
pub mod memcached;

pub use memory::{AsyncMemoryAdapter, MemoryAdapter};

#[cfg(feature = "sqlite")]
pub use sqlite::{AsyncSqliteAdapter, SqliteAdapter};

#[cfg(feature = "redis")]
pub use self::redis::{AsyncRedisAdapter, RedisAdapter};

#[cfg(feature = "memcached")]
pub use memcached::{AsyncMemcachedAdapter, MemcachedAdapter};
