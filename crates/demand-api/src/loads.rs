//! Handlers for `/loads` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/loads` | Body: `{"forecast":{..},"biometric":{..}}` |
//! | `GET`  | `/loads/{id}` | 404 if not found |
//! | `DELETE` | `/loads/{id}` | 204, or 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use demand_core::{
  Dataset,
  dataset::ExecutiveSummary,
  source::{DataSource, LoadRequest},
};
use serde::Serialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

/// What a caller needs to know about a completed load.
#[derive(Debug, Serialize)]
pub struct LoadSummary {
  pub id:             Uuid,
  pub fingerprint:    String,
  /// Which biometric column supplied the dates.
  pub date_column:    String,
  pub forecast_rows:  usize,
  pub biometric_rows: usize,
  pub risk_threshold: Option<f64>,
  pub summary:        ExecutiveSummary,
}

impl LoadSummary {
  pub fn new(id: Uuid, dataset: &Dataset) -> Self {
    Self {
      id,
      fingerprint: dataset.fingerprint.clone(),
      date_column: dataset.biometric().date_column.clone(),
      forecast_rows: dataset.forecast.len(),
      biometric_rows: dataset.biometric().records.len(),
      risk_threshold: dataset.risk_threshold,
      summary: dataset.summary(),
    }
  }
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /loads`: runs the whole pipeline; nothing is registered on failure.
pub async fn create<S: DataSource>(
  State(state): State<ApiState<S>>,
  Json(request): Json<LoadRequest>,
) -> Result<impl IntoResponse, ApiError> {
  let dataset = state.loader.load(&request).await?;
  let (id, dataset) = state.registry.insert(dataset).await;
  tracing::info!(%id, "load registered");
  Ok((StatusCode::CREATED, Json(LoadSummary::new(id, &dataset))))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /loads/{id}`
pub async fn get_one<S: DataSource>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<LoadSummary>, ApiError> {
  let dataset = lookup(&state, id).await?;
  Ok(Json(LoadSummary::new(id, &dataset)))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /loads/{id}`
pub async fn delete<S: DataSource>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  if !state.registry.remove(id).await {
    return Err(ApiError::NotFound(format!("load {id} not found")));
  }
  tracing::info!(%id, "load removed");
  Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn lookup<S: DataSource>(
  state: &ApiState<S>,
  id: Uuid,
) -> Result<Arc<Dataset>, ApiError> {
  state
    .registry
    .get(id)
    .await
    .ok_or_else(|| ApiError::NotFound(format!("load {id} not found")))
}
