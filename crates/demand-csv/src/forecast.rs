//! Forecast table decoding.

use csv::StringRecord;
use demand_core::{
  Error, Result, SchemaProblem, Table,
  forecast::{ForecastInput, RecommendedAction, RiskTier},
};

use crate::table::{CellReader, Column, RawTable, cell};

const PERIOD: &[&str] = &["ds", "period"];
const DEMAND: &[&str] = &["yhat", "predicted_demand"];
const STAFF: &[&str] = &["staff_needed"];
const COST: &[&str] = &["monthly_cost", "monthly_staff_cost"];
const BEST: &[&str] = &["best_case"];
const WORST: &[&str] = &["worst_case"];
const RISK: &[&str] = &["risk_tier", "demand_risk"];
const ACTION: &[&str] = &["recommended_action", "action"];

struct Columns {
  period: Column,
  demand: Column,
  staff:  Option<Column>,
  cost:   Option<Column>,
  best:   Option<Column>,
  worst:  Option<Column>,
  risk:   Option<Column>,
  action: Option<Column>,
}

fn resolve(table: &RawTable) -> Result<Columns> {
  let period = table.column(PERIOD);
  let demand = table.column(DEMAND);

  let (Some(period), Some(demand)) = (period.clone(), demand.clone()) else {
    let mut missing = Vec::new();
    if period.is_none() {
      missing.push("period (or ds)".to_owned());
    }
    if demand.is_none() {
      missing.push("predicted_demand (or yhat)".to_owned());
    }
    return Err(Error::schema(
      Table::Forecast,
      SchemaProblem::MissingColumns(missing),
    ));
  };

  Ok(Columns {
    period,
    demand,
    staff: table.column(STAFF),
    cost: table.column(COST),
    best: table.column(BEST),
    worst: table.column(WORST),
    risk: table.column(RISK),
    action: table.column(ACTION),
  })
}

/// A present, non-blank optional cell together with its column.
fn optional<'a>(
  record: &'a StringRecord,
  column: &'a Option<Column>,
) -> Option<(&'a Column, &'a str)> {
  let column = column.as_ref()?;
  cell(record, column).map(|value| (column, value))
}

/// Decode and validate the forecast table, returning rows sorted by period.
pub(crate) fn decode(input: &[u8], origin: &str) -> Result<Vec<ForecastInput>> {
  let table = RawTable::read(input, origin)?;
  let columns = resolve(&table)?;
  let reader = CellReader {
    table: Table::Forecast,
  };

  let mut rows = Vec::with_capacity(table.len());
  for (row, record) in table.rows() {
    let period = reader.date(record, &columns.period, row)?;
    let demand = match cell(record, &columns.demand) {
      Some(value) => reader.amount(&columns.demand, row, value)?,
      None => return Err(reader.invalid(&columns.demand, row, "")),
    };

    let mut input = ForecastInput::new(period, demand);
    if let Some((c, value)) = optional(record, &columns.staff) {
      input.staff_needed = Some(reader.count(c, row, value)?);
    }
    if let Some((c, value)) = optional(record, &columns.cost) {
      input.monthly_cost = Some(reader.count(c, row, value)?);
    }
    if let Some((c, value)) = optional(record, &columns.best) {
      input.best_case = Some(reader.amount(c, row, value)?);
    }
    if let Some((c, value)) = optional(record, &columns.worst) {
      input.worst_case = Some(reader.amount(c, row, value)?);
    }
    if let Some((c, value)) = optional(record, &columns.risk) {
      input.risk_tier = Some(reader.label::<RiskTier>(c, row, value)?);
    }
    if let Some((c, value)) = optional(record, &columns.action) {
      input.recommended_action =
        Some(reader.label::<RecommendedAction>(c, row, value)?);
    }
    rows.push(input);
  }

  rows.sort_by_key(|r| r.period);
  if let Some(pair) = rows.windows(2).find(|w| w[0].period == w[1].period) {
    return Err(Error::schema(
      Table::Forecast,
      SchemaProblem::DuplicatePeriod(pair[0].period),
    ));
  }
  Ok(rows)
}
