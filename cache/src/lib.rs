//! A pluggable caching layer with interchangeable backends and parallel
//! sync/async APIs.
//!
//! # Features
//! - **One contract, many stores**: memory, SQLite, Redis and Memcached
//!   adapters behind the same `get`/`set`/`remove`/`update_timeout`/
//!   `get_or_set` surface.
//! - **Sync & Async**: every backend ships a blocking adapter and an
//!   asynchronous twin; the two stacks mirror each other rather than hiding
//!   the suspension model behind one abstraction.
//! - **Typed values**: anything `serde`-serializable round-trips through a
//!   versioned byte envelope, identically on every backend.
//! - **Compile-time backend set**: adapter aliases resolve into a closed
//!   [`AdapterKind`] enum at configuration time, not string dispatch at call
//!   time.
//! - **Facade handles**: [`Cache`] / [`AsyncCache`] hold the active adapter
//!   and forward calls, with hot swapping via `adapter_set`.
//! - **Memoization**: [`Cached`] / [`AsyncCached`] cache function results
//!   under deterministically derived keys.
//!
//! This layer deliberately delegates expiry, persistence and concurrency to
//! each backing store. There is no eviction policy, no distributed locking
//! (`get_or_set` races are last-write-wins) and no retry logic here.

// Public modules that form the API
pub mod adapter;
pub mod adapter_async;
pub mod backend;
pub mod codec;
pub mod config;
pub mod error;
pub mod handles;
pub mod memo;
pub mod registry;

// Re-export the primary user-facing types for convenience
pub use adapter::{CacheAdapter, CacheAdapterExt, Ttl};
pub use adapter_async::{AsyncCacheAdapter, AsyncCacheAdapterExt};
pub use config::CacheConfig;
pub use error::{CacheError, CacheResult};
pub use handles::{AsyncCache, Cache};
pub use memo::{AsyncCached, Cached};
pub use registry::AdapterKind;
