//! The complete result of one load, and the views computed from it.
//!
//! A [`Dataset`] is only ever built whole: derivation and the unfiltered
//! aggregations run inside [`Dataset::build`], so a caller either gets every
//! table or an error.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
  PipelineConfig, Result,
  aggregate::{
    AgeGroup, AgeGroupTotal, DateTotal, StateAggregate, StateFilter,
    age_breakdown, spatial_ranking, temporal_top_k,
  },
  biometric::{BiometricRecord, BiometricTable},
  forecast::{ForecastInput, ForecastRecord, RiskTier, derive_forecast},
};

/// Headline numbers over the forecast horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutiveSummary {
  pub periods:           usize,
  pub average_demand:    Option<f64>,
  pub peak_demand:       Option<f64>,
  pub high_risk_periods: usize,
  pub total_cost:        u64,
}

/// Best / expected / worst projection for one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioPoint {
  pub period:     NaiveDate,
  pub best_case:  f64,
  pub expected:   f64,
  pub worst_case: f64,
}

/// Temporal top-K and full spatial ranking for one state filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregates {
  pub temporal: Vec<DateTotal>,
  pub spatial:  Vec<StateAggregate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
  pub forecast:       Vec<ForecastRecord>,
  /// The demand cutoff used for risk tiers; `None` for an empty forecast.
  pub risk_threshold: Option<f64>,
  /// Hex SHA-256 over the raw forecast and biometric bytes.
  pub fingerprint:    String,
  biometric:          BiometricTable,
  aggregates:         Aggregates,
  top_k:              usize,
}

impl Dataset {
  /// Derive and aggregate normalised tables. `config` is validated first.
  pub fn build(
    forecast: &[ForecastInput],
    biometric: BiometricTable,
    config: &PipelineConfig,
    fingerprint: String,
  ) -> Result<Self> {
    config.validate()?;
    let (forecast, risk_threshold) = derive_forecast(forecast, config);
    let aggregates =
      aggregate(&biometric.records, &StateFilter::All, config.top_k);
    Ok(Self {
      forecast,
      biometric,
      risk_threshold,
      aggregates,
      fingerprint,
      top_k: config.top_k,
    })
  }

  pub fn top_k(&self) -> usize { self.top_k }

  pub fn biometric(&self) -> &BiometricTable { &self.biometric }

  /// Unfiltered aggregations, computed once in [`Dataset::build`].
  pub fn aggregates(&self) -> &Aggregates { &self.aggregates }

  /// Re-run both aggregations over a subset of states. The forecast table is
  /// not touched.
  pub fn aggregate(&self, filter: &StateFilter) -> Aggregates {
    match filter {
      StateFilter::All => self.aggregates.clone(),
      StateFilter::Only(_) => {
        aggregate(&self.biometric.records, filter, self.top_k)
      }
    }
  }

  /// All state names, ranked by descending total updates.
  pub fn states(&self) -> Vec<&str> {
    self
      .aggregates
      .spatial
      .iter()
      .map(|a| a.state.as_str())
      .collect()
  }

  /// Interpret a user selection of states against this dataset.
  pub fn state_filter<I, S>(&self, selection: I) -> StateFilter
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    StateFilter::from_selection(selection, &self.states())
  }

  /// The first `top_k` states of the spatial ranking for `filter`.
  pub fn top_states(&self, filter: &StateFilter) -> Vec<StateAggregate> {
    let mut spatial = self.aggregate(filter).spatial;
    spatial.truncate(self.top_k);
    spatial
  }

  pub fn demographics(
    &self,
    filter: &StateFilter,
    groups: &[AgeGroup],
  ) -> Vec<AgeGroupTotal> {
    age_breakdown(&self.biometric.records, filter, groups)
  }

  pub fn summary(&self) -> ExecutiveSummary {
    let periods = self.forecast.len();
    let demand = self.forecast.iter().map(ForecastRecord::predicted_demand);
    let average_demand =
      (periods > 0).then(|| demand.clone().sum::<f64>() / periods as f64);
    let peak_demand = demand.reduce(f64::max);

    ExecutiveSummary {
      periods,
      average_demand,
      peak_demand,
      high_risk_periods: self
        .forecast
        .iter()
        .filter(|r| r.risk_tier() == RiskTier::High)
        .count(),
      total_cost: self
        .forecast
        .iter()
        .map(ForecastRecord::monthly_cost)
        .fold(0, u64::saturating_add),
    }
  }

  pub fn scenarios(&self) -> Vec<ScenarioPoint> {
    self
      .forecast
      .iter()
      .map(|r| ScenarioPoint {
        period:     r.period(),
        best_case:  r.best_case(),
        expected:   r.predicted_demand(),
        worst_case: r.worst_case(),
      })
      .collect()
  }
}

fn aggregate(
  records: &[BiometricRecord],
  filter: &StateFilter,
  top_k: usize,
) -> Aggregates {
  Aggregates {
    temporal: temporal_top_k(records, filter, top_k),
    spatial:  spatial_ranking(records, filter),
  }
}
