//! Runtime server configuration, deserialised from `config.toml` layered
//! under `DEMAND_*` environment variables.

use std::path::Path;

use demand_core::{PipelineConfig, source::LoadRequest};
use demand_ingest::IngestConfig;
use serde::Deserialize;

pub const ENV_PREFIX: &str = "DEMAND";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub pipeline:        PipelineConfig,
  pub ingest:          IngestConfig,
  /// Registered loads kept in memory; the oldest is evicted past this.
  pub max_loads:       usize,
  /// Sources loaded once at start-up, so the API has a dataset before the
  /// first request.
  pub default_sources: Option<LoadRequest>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:            "127.0.0.1".to_owned(),
      port:            8080,
      pipeline:        PipelineConfig::default(),
      ingest:          IngestConfig::default(),
      max_loads:       demand_api::registry::DEFAULT_CAPACITY,
      default_sources: None,
    }
  }
}

impl ServerConfig {
  /// Read `path` (optional) and then the environment. Nested keys use a
  /// double underscore: `DEMAND_PIPELINE__TOP_K=5`.
  pub fn load(
    path: &Path,
    env_prefix: &str,
  ) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix(env_prefix)
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}
