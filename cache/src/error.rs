use std::fmt;

/// The error taxonomy shared by every adapter, the facade and the memoizer.
///
/// Backend client errors are mapped into these variants at the adapter
/// boundary; nothing above the adapters adds retries or remaps them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
  /// The requested key is absent or expired. Only surfaced by strict
  /// lookups (`try_get`, `update_timeout`); plain `get` reports absence
  /// as `Ok(None)` instead.
  Miss { key: String },
  /// The backing store could not be reached, or an operation timed out.
  /// Never downgraded to a miss.
  Unavailable {
    backend: &'static str,
    reason: String,
  },
  /// A value could not be encoded for storage, or stored bytes could not
  /// be decoded (bad magic, unsupported envelope version, codec failure).
  InvalidValue { reason: String },
  /// The adapter alias is not one this crate knows about.
  UnknownBackend { alias: String },
  /// The adapter alias is recognized, but its backing feature was not
  /// compiled in.
  BackendDisabled { alias: String },
}

pub type CacheResult<T> = Result<T, CacheError>;

impl CacheError {
  /// True if this error is a plain cache miss.
  pub fn is_miss(&self) -> bool {
    matches!(self, CacheError::Miss { .. })
  }

  pub(crate) fn unavailable(backend: &'static str, reason: impl fmt::Display) -> Self {
    CacheError::Unavailable {
      backend,
      reason: reason.to_string(),
    }
  }

  pub(crate) fn invalid(reason: impl fmt::Display) -> Self {
    CacheError::InvalidValue {
      reason: reason.to_string(),
    }
  }
}

impl fmt::Display for CacheError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CacheError::Miss { key } => write!(f, "cache key {:?} not found or expired", key),
      CacheError::Unavailable { backend, reason } => {
        write!(f, "{} backend unavailable: {}", backend, reason)
      }
      CacheError::InvalidValue { reason } => write!(f, "invalid cache value: {}", reason),
      CacheError::UnknownBackend { alias } => write!(f, "unknown cache adapter {:?}", alias),
      CacheError::BackendDisabled { alias } => write!(
        f,
        "cache adapter {:?} is known but its cargo feature is not enabled",
        alias
      ),
    }
  }
}

impl std::error::Error for CacheError {}
