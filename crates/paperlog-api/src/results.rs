//! Handler for `GET /arxiv/results`.

use axum::{
  Json,
  extract::{Query, State, rejection::QueryRejection},
};
use paperlog_core::{
  feed::PaperFeed,
  record::QueryResult,
  store::{ArchiveStore, Page},
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{AppState, error::ApiError};

const DEFAULT_ITEMS_PER_PAGE: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct PageParams {
  /// Zero-based page index.
  #[serde(default)]
  pub page:           i64,
  #[serde(default = "default_items_per_page")]
  pub items_per_page: i64,
}

fn default_items_per_page() -> i64 { DEFAULT_ITEMS_PER_PAGE }

/// `GET /arxiv/results[?page=0][&items_per_page=10]`
pub async fn handler<S, F>(
  State(state): State<AppState<S, F>>,
  params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<Vec<QueryResult>>, ApiError>
where
  S: ArchiveStore + 'static,
  F: PaperFeed + 'static,
{
  let Query(params) = params?;
  let page = Page::new(params.page, params.items_per_page)
    .map_err(|e| ApiError::Unprocessable(e.to_string()))?;

  info!(page = params.page, items_per_page = params.items_per_page, "fetching results");
  let results = state
    .store
    .list_results(page)
    .await
    .map_err(ApiError::store)?;

  if results.is_empty() {
    warn!(page = params.page, "no results on page");
    return Err(ApiError::NotFound("No query results found.".to_owned()));
  }
  Ok(Json(results))
}
