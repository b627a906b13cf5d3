//! [`Loader`]: fetch, decode, and build one [`Dataset`].

use demand_core::{
  Dataset, PipelineConfig, Result,
  source::{DataSource, LoadRequest},
};
use sha2::{Digest, Sha256};

/// Runs the whole pipeline for a [`LoadRequest`].
///
/// The forecast is fetched and decoded before the biometric table, so a
/// broken forecast source is reported without touching the second one.
pub struct Loader<S> {
  source: S,
  config: PipelineConfig,
}

impl<S: DataSource> Loader<S> {
  /// Fails with `InvalidConfig` when `config` is out of range.
  pub fn new(source: S, config: PipelineConfig) -> Result<Self> {
    config.validate()?;
    Ok(Self { source, config })
  }

  pub fn source(&self) -> &S { &self.source }

  pub fn config(&self) -> &PipelineConfig { &self.config }

  pub async fn load(&self, request: &LoadRequest) -> Result<Dataset> {
    let forecast_origin = request.forecast.to_string();
    let forecast_bytes = self.source.fetch(&request.forecast).await?;
    let forecast = demand_csv::parse_forecast(&forecast_bytes, &forecast_origin)?;

    let biometric_origin = request.biometric.to_string();
    let biometric_bytes = self.source.fetch(&request.biometric).await?;
    let biometric =
      demand_csv::parse_biometric(&biometric_bytes, &biometric_origin)?;

    let dataset = Dataset::build(
      &forecast,
      biometric,
      &self.config,
      fingerprint(&forecast_bytes, &biometric_bytes),
    )?;

    tracing::info!(
      forecast = %forecast_origin,
      biometric = %biometric_origin,
      periods = dataset.forecast.len(),
      biometric_rows = dataset.biometric().records.len(),
      states = dataset.aggregates().spatial.len(),
      fingerprint = %dataset.fingerprint,
      "dataset loaded"
    );
    Ok(dataset)
  }
}

/// Hex SHA-256 over both inputs. Each table is length-prefixed, so moving
/// bytes from one input to the other changes the digest.
pub fn fingerprint(forecast: &[u8], biometric: &[u8]) -> String {
  let mut hasher = Sha256::new();
  for part in [forecast, biometric] {
    hasher.update((part.len() as u64).to_le_bytes());
    hasher.update(part);
  }
  hex::encode(hasher.finalize())
}
