//! Named, overridable constants that parameterise derivation and aggregation.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const DEFAULT_UNIT_RATE: f64 = 0.001;
pub const DEFAULT_COST_PER_STAFF: u64 = 25_000;
pub const DEFAULT_BEST_CASE_MULTIPLIER: f64 = 0.9;
pub const DEFAULT_WORST_CASE_MULTIPLIER: f64 = 1.2;
/// One cutoff for every deployment; see `DESIGN.md` for why 0.8.
pub const DEFAULT_RISK_PERCENTILE: f64 = 0.8;
pub const DEFAULT_TOP_K: usize = 10;

/// Pipeline parameters. Every field falls back to its default when absent
/// from a configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
  /// Staff required per unit of predicted demand.
  pub unit_rate:             f64,
  /// Monthly cost of one staff member.
  pub cost_per_staff:        u64,
  pub best_case_multiplier:  f64,
  pub worst_case_multiplier: f64,
  /// Quantile in `[0, 1]`; periods strictly above it are high risk.
  pub risk_percentile:       f64,
  /// Number of dates kept by the temporal top-K selection.
  pub top_k:                 usize,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      unit_rate:             DEFAULT_UNIT_RATE,
      cost_per_staff:        DEFAULT_COST_PER_STAFF,
      best_case_multiplier:  DEFAULT_BEST_CASE_MULTIPLIER,
      worst_case_multiplier: DEFAULT_WORST_CASE_MULTIPLIER,
      risk_percentile:       DEFAULT_RISK_PERCENTILE,
      top_k:                 DEFAULT_TOP_K,
    }
  }
}

impl PipelineConfig {
  pub fn validate(&self) -> Result<()> {
    let rates = [
      ("unit_rate", self.unit_rate),
      ("best_case_multiplier", self.best_case_multiplier),
      ("worst_case_multiplier", self.worst_case_multiplier),
    ];
    for (name, value) in rates {
      if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidConfig(format!(
          "{name} must be a finite, non-negative number (got {value})"
        )));
      }
    }
    if !(0.0..=1.0).contains(&self.risk_percentile) {
      return Err(Error::InvalidConfig(format!(
        "risk_percentile must lie in [0, 1] (got {})",
        self.risk_percentile
      )));
    }
    if self.top_k == 0 {
      return Err(Error::InvalidConfig("top_k must be at least 1".into()));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_are_valid() {
    let config = PipelineConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.cost_per_staff, 25_000);
    assert_eq!(config.top_k, 10);
  }

  #[test]
  fn partial_override_keeps_other_defaults() {
    let config: PipelineConfig =
      serde_json::from_str(r#"{"risk_percentile": 0.7}"#).unwrap();
    assert_eq!(config.risk_percentile, 0.7);
    assert_eq!(config.unit_rate, DEFAULT_UNIT_RATE);
  }

  #[test]
  fn rejects_percentile_out_of_range() {
    let config = PipelineConfig {
      risk_percentile: 80.0,
      ..Default::default()
    };
    assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
  }

  #[test]
  fn rejects_zero_top_k_and_nan_rate() {
    let config = PipelineConfig {
      top_k: 0,
      ..Default::default()
    };
    assert!(config.validate().is_err());

    let config = PipelineConfig {
      unit_rate: f64::NAN,
      ..Default::default()
    };
    assert!(config.validate().is_err());
  }
}
