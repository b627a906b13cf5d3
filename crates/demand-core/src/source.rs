//! Source descriptors and the [`DataSource`] fetch abstraction.
//!
//! The trait is implemented by `demand-ingest`. Higher layers depend on this
//! abstraction rather than on any concrete transport.

use std::{fmt, future::Future, path::PathBuf, str::FromStr};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Where one input table comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceDescriptor {
  /// A CSV file on the local filesystem.
  File { path: PathBuf },
  /// A CSV document served over HTTP(S).
  Url { url: String },
  /// An object-storage blob, resolved to a download URL by the fetcher.
  Blob { id: String },
  /// CSV content uploaded directly by the caller.
  Inline { name: String, content: String },
}

impl SourceDescriptor {
  /// Whether fetching this source touches the network or the filesystem.
  /// Inline content is never worth caching.
  pub fn is_remote(&self) -> bool { !matches!(self, Self::Inline { .. }) }
}

/// Blob ids are spliced into a URL, so only `[A-Za-z0-9_-]+` is accepted.
pub fn is_valid_blob_id(id: &str) -> bool {
  !id.is_empty()
    && id
      .bytes()
      .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

impl fmt::Display for SourceDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::File { path } => write!(f, "file:{}", path.display()),
      Self::Url { url } => f.write_str(url),
      Self::Blob { id } => write!(f, "blob:{id}"),
      Self::Inline { name, .. } => write!(f, "inline:{name}"),
    }
  }
}

/// Command-line shorthand: `blob:<id>`, an `http(s)://` URL, or a path.
impl FromStr for SourceDescriptor {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let s = s.trim();
    if s.is_empty() {
      return Err(Error::InvalidConfig("empty source descriptor".into()));
    }
    if let Some(id) = s.strip_prefix("blob:") {
      if id.is_empty() {
        return Err(Error::InvalidConfig("blob source needs an id".into()));
      }
      if !is_valid_blob_id(id) {
        return Err(Error::InvalidConfig(format!("invalid blob id {id:?}")));
      }
      return Ok(Self::Blob { id: id.to_owned() });
    }
    if s.starts_with("http://") || s.starts_with("https://") {
      return Ok(Self::Url { url: s.to_owned() });
    }
    let path = s.strip_prefix("file:").unwrap_or(s);
    Ok(Self::File {
      path: PathBuf::from(path),
    })
  }
}

/// The pair of sources that make up one load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadRequest {
  pub forecast:  SourceDescriptor,
  pub biometric: SourceDescriptor,
}

/// Fetches the raw bytes behind a [`SourceDescriptor`].
///
/// Implementations fail with [`Error::DataUnavailable`] when the source is
/// unreachable, refused, or absent. They never retry on their own.
pub trait DataSource: Send + Sync {
  fn fetch<'a>(
    &'a self,
    descriptor: &'a SourceDescriptor,
  ) -> impl Future<Output = Result<Bytes>> + Send + 'a;
}
