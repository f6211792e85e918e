//! Handler for `POST /arxiv/search`.
//!
//! Body: [`SearchFilters`]. On success the feed's answer is archived and the
//! stored record is returned with `201 Created`.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use paperlog_core::{feed::PaperFeed, query::SearchFilters, store::ArchiveStore};
use tracing::{info, warn};

use crate::{AppState, error::ApiError};

/// `POST /arxiv/search`, body: `{"author":..., "title":..., "journal":..., "max_query_results":8}`
pub async fn handler<S, F>(
  State(state): State<AppState<S, F>>,
  body: Result<Json<SearchFilters>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ArchiveStore + 'static,
  F: PaperFeed + 'static,
{
  let Json(filters) = body?;

  let (query, outcome) = state.feed.search(&filters).await.inspect_err(|e| {
    warn!(error = %e, "search did not produce results");
  })?;

  let archived = state
    .store
    .archive(&query, &outcome, outcome.status)
    .await
    .map_err(ApiError::store)?;

  info!(
    id = archived.record.id,
    results = archived.results.len(),
    "query record created"
  );
  Ok((StatusCode::CREATED, Json(archived)))
}
