//! Fetch and cache settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Download URL for a blob id; `{id}` is substituted.
pub const DEFAULT_BLOB_URL_TEMPLATE: &str =
  "https://drive.google.com/uc?export=download&id={id}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
  /// How long a fetched source stays fresh in the cache. Zero disables it.
  pub cache_ttl_secs:       u64,
  pub request_timeout_secs: u64,
  pub user_agent:           String,
  pub blob_url_template:    String,
}

impl Default for IngestConfig {
  fn default() -> Self {
    Self {
      cache_ttl_secs:       3600,
      request_timeout_secs: 30,
      user_agent:           concat!("demand-ingest/", env!("CARGO_PKG_VERSION"))
        .to_owned(),
      blob_url_template:    DEFAULT_BLOB_URL_TEMPLATE.to_owned(),
    }
  }
}

impl IngestConfig {
  pub fn cache_ttl(&self) -> Duration { Duration::from_secs(self.cache_ttl_secs) }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }
}
