//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
///
/// A refused command never lands here: denials serialize as ordinary
/// responses. Errors cover dangling ids, malformed requests, and store
/// failures.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<plenum_workflow::Error> for ApiError {
  fn from(e: plenum_workflow::Error) -> Self {
    use plenum_workflow::Error::*;
    match e {
      ContribNotFound(_) | AssessmentNotFound(_) | ReviewNotFound(_) => {
        ApiError::NotFound(e.to_string())
      }
      UnknownTable(_) => ApiError::BadRequest(e.to_string()),
      Store(_) | MissingDecisionValue(_) => ApiError::Store(Box::new(e)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
