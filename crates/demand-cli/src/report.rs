//! Plain-text renderings of a [`Dataset`].

use std::fmt::Write as _;

use demand_core::{
  Dataset,
  aggregate::{AgeGroup, ChildShare, StateFilter},
};

fn child_share(share: ChildShare) -> String {
  match share {
    ChildShare::Percent(pct) => format!("{pct:.1}%"),
    ChildShare::Undefined => "n/a".to_owned(),
  }
}

fn optional(value: Option<f64>) -> String {
  value.map_or_else(|| "n/a".to_owned(), |v| format!("{v:.1}"))
}

// ─── Forecast views ───────────────────────────────────────────────────────────

pub fn summary(dataset: &Dataset) -> String {
  let summary = dataset.summary();
  let mut out = String::new();
  let _ = writeln!(out, "Periods:             {}", summary.periods);
  let average = optional(summary.average_demand);
  let _ = writeln!(out, "Average demand:      {average}");
  let peak = optional(summary.peak_demand);
  let _ = writeln!(out, "Peak demand:         {peak}");
  let threshold = optional(dataset.risk_threshold);
  let _ = writeln!(out, "Risk threshold:      {threshold}");
  let _ = writeln!(out, "High-risk periods:   {}", summary.high_risk_periods);
  let _ = writeln!(out, "Total staffing cost: {}", summary.total_cost);
  let _ = writeln!(out, "Fingerprint:         {}", dataset.fingerprint);
  out
}

pub fn planning(dataset: &Dataset) -> String {
  let mut out = String::new();
  let _ = writeln!(
    out,
    "{:<10}  {:>12}  {:>6}  {:>12}  {:<4}  {}",
    "period", "demand", "staff", "cost", "risk", "action"
  );
  for record in &dataset.forecast {
    let _ = writeln!(
      out,
      "{:<10}  {:>12.1}  {:>6}  {:>12}  {:<4}  {}",
      record.period().to_string(),
      record.predicted_demand(),
      record.staff_needed(),
      record.monthly_cost(),
      record.risk_tier().to_string(),
      record.recommended_action(),
    );
  }
  out
}

pub fn scenarios(dataset: &Dataset) -> String {
  let mut out = String::new();
  let _ = writeln!(
    out,
    "{:<10}  {:>12}  {:>12}  {:>12}",
    "period", "best", "expected", "worst"
  );
  for point in dataset.scenarios() {
    let _ = writeln!(
      out,
      "{:<10}  {:>12.1}  {:>12.1}  {:>12.1}",
      point.period.to_string(),
      point.best_case,
      point.expected,
      point.worst_case
    );
  }
  out
}

// ─── Biometric views ──────────────────────────────────────────────────────────

pub fn historical(dataset: &Dataset, filter: &StateFilter) -> String {
  let aggregates = dataset.aggregate(filter);
  let mut out = String::new();

  let _ = writeln!(out, "Top {} dates by updates", dataset.top_k());
  for total in &aggregates.temporal {
    let _ = writeln!(out, "  {}  {:>12}", total.date, total.total_updates);
  }

  let _ = writeln!(out, "\nStates by updates");
  let _ = writeln!(
    out,
    "  {:<24}  {:>10}  {:>10}  {:>10}  {:>7}",
    "state", "5-17", "18+", "total", "child"
  );
  for state in &aggregates.spatial {
    let _ = writeln!(
      out,
      "  {:<24}  {:>10}  {:>10}  {:>10}  {:>7}",
      state.state,
      state.age_5_17,
      state.age_18_plus,
      state.total,
      child_share(state.child_share),
    );
  }
  out
}

pub fn demographics(
  dataset: &Dataset,
  filter: &StateFilter,
  groups: &[AgeGroup],
) -> String {
  let mut out = String::new();
  for total in dataset.demographics(filter, groups) {
    let _ = writeln!(out, "{:<6}  {:>12}", total.group.to_string(), total.total);
  }
  out
}
