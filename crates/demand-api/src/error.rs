//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use demand_core::{Error, ErrorKind};
use serde_json::{Map, Value, json};
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Pipeline(#[from] Error),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Pipeline(e) => match e.kind() {
        ErrorKind::DataUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::DataFormat
        | ErrorKind::Schema
        | ErrorKind::DivisionUndefined => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::InvalidConfig => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }

  fn kind(&self) -> &'static str {
    match self {
      ApiError::NotFound(_) => "not_found",
      ApiError::BadRequest(_) => "bad_request",
      ApiError::Pipeline(e) => e.kind().into(),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::warn!(error = %self, "request failed");
    }

    let mut body = Map::new();
    body.insert("kind".into(), json!(self.kind()));
    body.insert("message".into(), json!(self.to_string()));
    if let ApiError::Pipeline(e) = &self {
      if let Some(subject) = e.subject() {
        body.insert("source".into(), json!(subject));
      }
      if let Error::DataUnavailable { hint, .. } = e {
        body.insert("hint".into(), json!(hint));
      }
    }
    (status, Json(json!({ "error": Value::Object(body) }))).into_response()
  }
}
