//! Forecast table: risk tiers, staffing, and scenario bands.
//!
//! Derivation is a pure function of the predicted-demand series and the
//! [`PipelineConfig`]. Values supplied upstream take precedence over locally
//! derived ones, field by field.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::PipelineConfig;

// ─── Classification ──────────────────────────────────────────────────────────

/// Coarse classification of a forecast period against the series threshold.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
  strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RiskTier {
  Low,
  High,
}

impl RiskTier {
  /// `High` iff `demand` is strictly above `threshold`. With no threshold
  /// (an empty series) everything is `Low`.
  pub fn classify(demand: f64, threshold: Option<f64>) -> Self {
    match threshold {
      Some(cutoff) if demand > cutoff => Self::High,
      _ => Self::Low,
    }
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
  strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RecommendedAction {
  Monitor,
  RecruitNow,
}

impl RecommendedAction {
  pub const fn for_tier(tier: RiskTier) -> Self {
    match tier {
      RiskTier::High => Self::RecruitNow,
      RiskTier::Low => Self::Monitor,
    }
  }
}

/// Linear-interpolation quantile of `values` (the same rule as pandas'
/// default). `q` is clamped to `[0, 1]`.
///
/// A single-element series returns that element, so the element is never
/// strictly above its own threshold. An empty series has no quantile.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
  if values.is_empty() {
    return None;
  }
  let mut sorted = values.to_vec();
  sorted.sort_by(f64::total_cmp);

  let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
  let lower = position.floor() as usize;
  let upper = position.ceil() as usize;
  let fraction = position - lower as f64;
  Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// One normalised forecast row as read from the source. Optional fields are
/// present only when the source table carried a value for them.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastInput {
  pub period:             NaiveDate,
  pub predicted_demand:   f64,
  pub staff_needed:       Option<u64>,
  pub monthly_cost:       Option<u64>,
  pub best_case:          Option<f64>,
  pub worst_case:         Option<f64>,
  pub risk_tier:          Option<RiskTier>,
  pub recommended_action: Option<RecommendedAction>,
}

impl ForecastInput {
  /// A row with only the two required fields.
  pub fn new(period: NaiveDate, predicted_demand: f64) -> Self {
    Self {
      period,
      predicted_demand,
      staff_needed: None,
      monthly_cost: None,
      best_case: None,
      worst_case: None,
      risk_tier: None,
      recommended_action: None,
    }
  }
}

// ─── Derived record ──────────────────────────────────────────────────────────

/// A fully derived forecast period. Only [`derive_forecast`] builds these, so
/// the derived fields can never drift from their source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRecord {
  period:             NaiveDate,
  predicted_demand:   f64,
  staff_needed:       u64,
  monthly_cost:       u64,
  best_case:          f64,
  worst_case:         f64,
  risk_tier:          RiskTier,
  recommended_action: RecommendedAction,
}

impl ForecastRecord {
  pub fn period(&self) -> NaiveDate { self.period }

  pub fn predicted_demand(&self) -> f64 { self.predicted_demand }

  pub fn staff_needed(&self) -> u64 { self.staff_needed }

  pub fn monthly_cost(&self) -> u64 { self.monthly_cost }

  pub fn best_case(&self) -> f64 { self.best_case }

  pub fn worst_case(&self) -> f64 { self.worst_case }

  pub fn risk_tier(&self) -> RiskTier { self.risk_tier }

  pub fn recommended_action(&self) -> RecommendedAction {
    self.recommended_action
  }
}

/// Staff needed for `demand`, truncated toward zero.
pub fn staff_for(demand: f64, unit_rate: f64) -> u64 {
  (demand * unit_rate).floor().max(0.0) as u64
}

/// Derive every dependent column for `inputs`.
///
/// Returns the records (in input order) and the risk threshold that was
/// applied, or `None` when the series is empty.
pub fn derive_forecast(
  inputs: &[ForecastInput],
  config: &PipelineConfig,
) -> (Vec<ForecastRecord>, Option<f64>) {
  let demand: Vec<f64> = inputs.iter().map(|i| i.predicted_demand).collect();
  let threshold = percentile(&demand, config.risk_percentile);

  let records = inputs
    .iter()
    .map(|input| {
      let demand = input.predicted_demand;
      let staff_needed = input
        .staff_needed
        .unwrap_or_else(|| staff_for(demand, config.unit_rate));
      let monthly_cost = input
        .monthly_cost
        .unwrap_or_else(|| staff_needed.saturating_mul(config.cost_per_staff));
      let risk_tier = input
        .risk_tier
        .unwrap_or_else(|| RiskTier::classify(demand, threshold));
      let recommended_action = RecommendedAction::for_tier(risk_tier);

      if let Some(supplied) = input.recommended_action
        && supplied != recommended_action
      {
        tracing::warn!(
          period = %input.period,
          %supplied,
          derived = %recommended_action,
          "upstream action disagrees with risk tier; using derived action"
        );
      }

      ForecastRecord {
        period: input.period,
        predicted_demand: demand,
        staff_needed,
        monthly_cost,
        best_case: input
          .best_case
          .unwrap_or(demand * config.best_case_multiplier),
        worst_case: input
          .worst_case
          .unwrap_or(demand * config.worst_case_multiplier),
        risk_tier,
        recommended_action,
      }
    })
    .collect();

  (records, threshold)
}
