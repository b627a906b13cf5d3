//! Read-only views over a registered load.
//!
//! `states` and `ages` are accepted as comma-separated strings. An absent or
//! empty `states` means every state; an absent `ages` means every age group,
//! while an empty `ages=` selects none.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use demand_core::{
  Dataset,
  aggregate::{AgeGroup, AgeGroupTotal, StateAggregate, StateFilter},
  dataset::{Aggregates, ScenarioPoint},
  forecast::ForecastRecord,
  source::DataSource,
};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use uuid::Uuid;

use crate::{ApiState, error::ApiError, loads::lookup};

fn split(list: &str) -> impl Iterator<Item = &str> {
  list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn state_filter(dataset: &Dataset, states: Option<&str>) -> StateFilter {
  dataset.state_filter(states.map(split).into_iter().flatten())
}

// ─── Forecast ─────────────────────────────────────────────────────────────────

/// `GET /loads/{id}/forecast`
pub async fn forecast<S: DataSource>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<ForecastRecord>>, ApiError> {
  let dataset = lookup(&state, id).await?;
  Ok(Json(dataset.forecast.clone()))
}

/// `GET /loads/{id}/scenarios`
pub async fn scenarios<S: DataSource>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<ScenarioPoint>>, ApiError> {
  let dataset = lookup(&state, id).await?;
  Ok(Json(dataset.scenarios()))
}

// ─── Aggregates ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct AggregateParams {
  pub states: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AggregateResponse {
  #[serde(flatten)]
  pub aggregates: Aggregates,
  /// The first `top_k` entries of `spatial`.
  pub top_states: Vec<StateAggregate>,
}

/// `GET /loads/{id}/aggregates[?states=A,B]`
pub async fn aggregates<S: DataSource>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<AggregateParams>,
) -> Result<Json<AggregateResponse>, ApiError> {
  let dataset = lookup(&state, id).await?;
  let filter = state_filter(&dataset, params.states.as_deref());
  let aggregates = dataset.aggregate(&filter);
  let mut top_states = aggregates.spatial.clone();
  top_states.truncate(dataset.top_k());
  Ok(Json(AggregateResponse {
    aggregates,
    top_states,
  }))
}

// ─── Demographics ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct DemographicsParams {
  pub states: Option<String>,
  /// Comma-separated age groups, e.g. `5_17,18_plus`.
  pub ages:   Option<String>,
}

/// `GET /loads/{id}/demographics[?states=..][&ages=..]`
pub async fn demographics<S: DataSource>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<DemographicsParams>,
) -> Result<Json<Vec<AgeGroupTotal>>, ApiError> {
  let groups = match params.ages.as_deref() {
    None => AgeGroup::iter().collect(),
    Some(list) => split(list)
      .map(|g| {
        g.parse::<AgeGroup>()
          .map_err(|_| ApiError::BadRequest(format!("unknown age group {g:?}")))
      })
      .collect::<Result<Vec<_>, _>>()?,
  };

  let dataset = lookup(&state, id).await?;
  let filter = state_filter(&dataset, params.states.as_deref());
  Ok(Json(dataset.demographics(&filter, &groups)))
}

// ─── States ───────────────────────────────────────────────────────────────────

/// `GET /loads/{id}/states`: names ranked by descending total updates.
pub async fn states<S: DataSource>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<String>>, ApiError> {
  let dataset = lookup(&state, id).await?;
  Ok(Json(dataset.states().into_iter().map(str::to_owned).collect()))
}
