//! The versioned envelope every backend stores values in.
//!
//! Layout: 2 magic bytes, 1 format-version byte, then a bincode body.
//! The envelope is what makes blobs written by one build readable by
//! another (and rejectable, with a clear error, when they are not),
//! which matters most for the SQLite backend where entries outlive the
//! process.

use crate::error::{CacheError, CacheResult};

use serde::de::DeserializeOwned;
use serde::Serialize;

const MAGIC: [u8; 2] = *b"hc";
const VERSION: u8 = 1;

/// Encodes `value` into a self-describing byte envelope.
pub fn encode<T>(value: &T) -> CacheResult<Vec<u8>>
where
  T: Serialize + ?Sized,
{
  let body = bincode::serialize(value).map_err(CacheError::invalid)?;
  let mut out = Vec::with_capacity(3 + body.len());
  out.extend_from_slice(&MAGIC);
  out.push(VERSION);
  out.extend_from_slice(&body);
  Ok(out)
}

/// Decodes an envelope produced by [`encode`].
pub fn decode<T>(bytes: &[u8]) -> CacheResult<T>
where
  T: DeserializeOwned,
{
  if bytes.len() < 3 || bytes[..2] != MAGIC {
    return Err(CacheError::invalid("missing envelope magic"));
  }
  if bytes[2] != VERSION {
    return Err(CacheError::invalid(format!(
      "unsupported envelope version {}",
      bytes[2]
    )));
  }
  bincode::deserialize(&bytes[3..]).map_err(CacheError::invalid)
}
