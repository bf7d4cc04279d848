//! The user-facing facade handles.
//!
//! A [`Cache`](sync::Cache) or [`AsyncCache`](futures::AsyncCache) holds the
//! currently active adapter and forwards every operation to it, so
//! application code can pass one handle around instead of threading a
//! concrete adapter everywhere. The two are independent: sync and async
//! traffic each get their own active-adapter slot.

pub mod futures;
pub mod sync;

pub use futures::AsyncCache;
pub use sync::Cache;
