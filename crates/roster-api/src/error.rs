//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use roster_core::store::StoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a store error by the domain condition behind it.
  pub fn from_store<E: StoreError>(err: E) -> Self {
    match err.domain() {
      Some(roster_core::Error::NotFound(id)) => {
        ApiError::NotFound(format!("participant {id} not found"))
      }
      Some(e) => ApiError::BadRequest(e.to_string()),
      None => ApiError::Store(Box::new(err)),
    }
  }
}

impl From<roster_core::Error> for ApiError {
  fn from(err: roster_core::Error) -> Self {
    match err {
      roster_core::Error::NotFound(id) => {
        ApiError::NotFound(format!("participant {id} not found"))
      }
      other => ApiError::BadRequest(other.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
