//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error renders as `{"detail": "<message>"}`.

use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  BadRequest(String),

  /// Well-formed request whose values are unusable (timestamps, paging).
  #[error("{0}")]
  Unprocessable(String),

  #[error("{0}")]
  NotFound(String),

  #[error("arXiv API not available.")]
  UpstreamUnavailable,

  /// The feed answered with this non-success status; it is passed through.
  #[error("Error querying arxiv API.")]
  Upstream(u16),

  #[error("{0}")]
  BadGateway(String),

  /// An extractor rejected the request before the handler ran.
  #[error("{message}")]
  Rejected { status: StatusCode, message: String },

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    ApiError::Store(Box::new(e))
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
      ApiError::Upstream(code) => {
        StatusCode::from_u16(*code).unwrap_or(StatusCode::BAD_GATEWAY)
      }
      ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
      ApiError::Rejected { status, .. } => *status,
      ApiError::Csv(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<paperlog_core::Error> for ApiError {
  fn from(e: paperlog_core::Error) -> Self {
    use paperlog_core::Error as E;
    match e {
      E::InvalidRequest(m) => ApiError::BadRequest(m),
      E::UpstreamUnavailable(_) => ApiError::UpstreamUnavailable,
      E::UpstreamError(code) => ApiError::Upstream(code),
      E::MalformedFeed(m) => ApiError::BadGateway(format!("Malformed arxiv response: {m}")),
      E::NoResults => ApiError::NotFound("No results found.".to_owned()),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(r: JsonRejection) -> Self {
    ApiError::Rejected { status: r.status(), message: r.body_text() }
  }
}

impl From<QueryRejection> for ApiError {
  fn from(r: QueryRejection) -> Self { ApiError::Unprocessable(r.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!(%status, error = %self, "request failed");
    }
    (status, Json(json!({ "detail": self.to_string() }))).into_response()
  }
}
