//! JSON REST API for the demand pipeline.
//!
//! Exposes an axum [`Router`] backed by a [`Loader`] over any
//! [`DataSource`]. Completed loads live in an in-memory [`LoadRegistry`];
//! every view is computed from a registered load, so the forecast table is
//! never re-derived for a filter change.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", demand_api::api_router(state))
//! ```

pub mod error;
pub mod loads;
pub mod registry;
pub mod views;

use std::sync::Arc;

use axum::{Router, routing::get};
use demand_core::source::DataSource;
use demand_ingest::Loader;

pub use error::ApiError;
pub use registry::LoadRegistry;

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub loader:   Arc<Loader<S>>,
  pub registry: Arc<LoadRegistry>,
}

impl<S> ApiState<S> {
  pub fn new(loader: Loader<S>) -> Self {
    Self::with_registry(loader, LoadRegistry::new())
  }

  pub fn with_registry(loader: Loader<S>, registry: LoadRegistry) -> Self {
    Self {
      loader:   Arc::new(loader),
      registry: Arc::new(registry),
    }
  }
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      loader:   self.loader.clone(),
      registry: self.registry.clone(),
    }
  }
}

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: DataSource + 'static,
{
  Router::new()
    // Loads
    .route("/loads", axum::routing::post(loads::create::<S>))
    .route(
      "/loads/{id}",
      get(loads::get_one::<S>).delete(loads::delete::<S>),
    )
    // Views
    .route("/loads/{id}/forecast", get(views::forecast::<S>))
    .route("/loads/{id}/scenarios", get(views::scenarios::<S>))
    .route("/loads/{id}/aggregates", get(views::aggregates::<S>))
    .route("/loads/{id}/demographics", get(views::demographics::<S>))
    .route("/loads/{id}/states", get(views::states::<S>))
    .with_state(state)
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use demand_core::PipelineConfig;
  use demand_ingest::{IngestConfig, SourceFetcher};
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  const FORECAST: &str = "ds,yhat\n\
                          2025-01-01,1000\n\
                          2025-02-01,5000\n\
                          2025-03-01,2000\n\
                          2025-04-01,9000\n\
                          2025-05-01,3000\n";

  const BIOMETRIC: &str = "date,state,bio_age_5_17,bio_age_17_\n\
                           01-01-2025,X,10,20\n\
                           01-01-2025,Y,5,5\n\
                           02-01-2025,Z,0,0\n";

  fn state() -> ApiState<SourceFetcher> {
    let fetcher = SourceFetcher::new(&IngestConfig::default()).unwrap();
    ApiState::new(Loader::new(fetcher, PipelineConfig::default()).unwrap())
  }

  fn load_body(forecast: &str, biometric: &str) -> Value {
    json!({
      "forecast": {
        "kind": "inline", "name": "forecast.csv", "content": forecast
      },
      "biometric": {
        "kind": "inline", "name": "bio.csv", "content": biometric
      },
    })
  }

  async fn send(
    state: &ApiState<SourceFetcher>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
      Some(body) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string())),
      None => builder.body(Body::empty()),
    }
    .unwrap();

    let resp = api_router(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn create_load(state: &ApiState<SourceFetcher>) -> String {
    let (status, body) =
      send(state, "POST", "/loads", Some(load_body(FORECAST, BIOMETRIC))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_owned()
  }

  // ── Loads ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_returns_summary() {
    let state = state();
    let (status, body) =
      send(&state, "POST", "/loads", Some(load_body(FORECAST, BIOMETRIC))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["forecast_rows"], 5);
    assert_eq!(body["biometric_rows"], 3);
    assert_eq!(body["date_column"], "date");
    assert_eq!(body["summary"]["peak_demand"], 9000.0);
    assert_eq!(body["summary"]["high_risk_periods"], 1);
    assert_eq!(body["fingerprint"].as_str().unwrap().len(), 64);
    assert_eq!(state.registry.len().await, 1);
  }

  #[tokio::test]
  async fn get_one_round_trips_the_summary() {
    let state = state();
    let id = create_load(&state).await;
    let (status, body) = send(&state, "GET", &format!("/loads/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
  }

  #[tokio::test]
  async fn deleted_load_is_gone() {
    let state = state();
    let id = create_load(&state).await;
    let uri = format!("/loads/{id}");

    let (status, _) = send(&state, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(state.registry.is_empty().await);

    let (status, _) = send(&state, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&state, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn registry_keeps_only_the_newest_loads() {
    let fetcher = SourceFetcher::new(&IngestConfig::default()).unwrap();
    let loader = Loader::new(fetcher, PipelineConfig::default()).unwrap();
    let state = ApiState::with_registry(loader, LoadRegistry::with_capacity(1));

    let first = create_load(&state).await;
    let second = create_load(&state).await;
    assert_eq!(state.registry.len().await, 1);

    let (status, _) = send(&state, "GET", &format!("/loads/{first}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) =
      send(&state, "GET", &format!("/loads/{second}"), None).await;
    assert_eq!(status, StatusCode::OK);
  }

  #[tokio::test]
  async fn unknown_load_is_404() {
    let state = state();
    let uri = format!("/loads/{}/forecast", uuid::Uuid::new_v4());
    let (status, body) = send(&state, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "not_found");
  }

  #[tokio::test]
  async fn schema_error_is_422_and_nothing_is_registered() {
    let state = state();
    let (status, body) = send(
      &state,
      "POST",
      "/loads",
      Some(load_body("month,value\n2025-01-01,1\n", BIOMETRIC)),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["kind"], "schema");
    assert!(state.registry.is_empty().await);
  }

  #[tokio::test]
  async fn missing_file_is_503_with_source() {
    let state = state();
    let body = json!({
      "forecast":  { "kind": "file", "path": "/definitely/not/here.csv" },
      "biometric": { "kind": "inline", "name": "bio.csv", "content": BIOMETRIC },
    });
    let (status, body) = send(&state, "POST", "/loads", Some(body)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["source"], "file:/definitely/not/here.csv");
  }

  // ── Views ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn forecast_table_has_derived_columns() {
    let state = state();
    let id = create_load(&state).await;
    let (_, body) =
      send(&state, "GET", &format!("/loads/{id}/forecast"), None).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[3]["risk_tier"], "high");
    assert_eq!(rows[3]["recommended_action"], "recruit_now");
    assert_eq!(rows[0]["staff_needed"], 1);
    assert_eq!(rows[0]["monthly_cost"], 25_000);
  }

  #[tokio::test]
  async fn scenarios_bracket_expected_demand() {
    let state = state();
    let id = create_load(&state).await;
    let (_, body) =
      send(&state, "GET", &format!("/loads/{id}/scenarios"), None).await;
    let first = &body[0];
    let field = |name: &str| first[name].as_f64().unwrap();
    assert_eq!(field("expected"), 1000.0);
    assert!((field("best_case") - 900.0).abs() < 1e-9);
    assert!((field("worst_case") - 1200.0).abs() < 1e-9);
  }

  #[tokio::test]
  async fn aggregates_honour_state_filter() {
    let state = state();
    let id = create_load(&state).await;

    let (_, all) =
      send(&state, "GET", &format!("/loads/{id}/aggregates"), None).await;
    assert_eq!(all["spatial"].as_array().unwrap().len(), 3);
    assert_eq!(all["spatial"][2]["child_share"], "undefined");

    let (_, only_x) = send(
      &state,
      "GET",
      &format!("/loads/{id}/aggregates?states=X"),
      None,
    )
    .await;
    let spatial = only_x["spatial"].as_array().unwrap();
    assert_eq!(spatial.len(), 1);
    assert_eq!(spatial[0]["state"], "X");
    assert_eq!(spatial[0]["child_share"]["percent"], 33.3);
    assert_eq!(only_x["temporal"][0]["total_updates"], 30);
  }

  #[tokio::test]
  async fn demographics_select_age_groups() {
    let state = state();
    let id = create_load(&state).await;

    let (_, both) =
      send(&state, "GET", &format!("/loads/{id}/demographics"), None).await;
    assert_eq!(both.as_array().unwrap().len(), 2);

    let (status, adults) = send(
      &state,
      "GET",
      &format!("/loads/{id}/demographics?states=X,Y&ages=18_plus"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(adults, json!([{ "group": "18_plus", "total": 25 }]));

    let (_, none) = send(
      &state,
      "GET",
      &format!("/loads/{id}/demographics?ages="),
      None,
    )
    .await;
    assert_eq!(none, json!([]));
  }

  #[tokio::test]
  async fn unknown_age_group_is_400() {
    let state = state();
    let id = create_load(&state).await;
    let (status, _) = send(
      &state,
      "GET",
      &format!("/loads/{id}/demographics?ages=toddlers"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn states_are_ranked() {
    let state = state();
    let id = create_load(&state).await;
    let (_, body) =
      send(&state, "GET", &format!("/loads/{id}/states"), None).await;
    assert_eq!(body, json!(["X", "Y", "Z"]));
  }
}
