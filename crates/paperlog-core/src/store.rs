//! The `ArchiveStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `paperlog-store-sqlite`).
//! The HTTP layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  Error, Result,
  feed::SearchOutcome,
  query::ComposedQuery,
  record::{QueryRecord, QueryRecordWithResults, QueryResult},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Inclusive timestamp window for [`ArchiveStore::list_queries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
  pub start: DateTime<Utc>,
  /// Open-ended when `None`.
  pub end:   Option<DateTime<Utc>>,
}

impl TimeRange {
  pub fn since(start: DateTime<Utc>) -> Self { Self { start, end: None } }

  pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
    Self { start, end: Some(end) }
  }
}

/// A validated page window for [`ArchiveStore::list_results`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
  offset: i64,
  limit:  i64,
}

impl Page {
  /// `page` is zero-based; `items_per_page` must be at least one.
  pub fn new(page: i64, items_per_page: i64) -> Result<Self> {
    if page < 0 {
      return Err(Error::InvalidRequest(format!(
        "page must be non-negative, got {page}"
      )));
    }
    if items_per_page < 1 {
      return Err(Error::InvalidRequest(format!(
        "items_per_page must be at least 1, got {items_per_page}"
      )));
    }
    let offset = page.checked_mul(items_per_page).ok_or_else(|| {
      Error::InvalidRequest("page * items_per_page is out of range".to_owned())
    })?;
    Ok(Self { offset, limit: items_per_page })
  }

  pub fn offset(&self) -> i64 { self.offset }

  pub fn limit(&self) -> i64 { self.limit }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the search archive.
///
/// Records are append-only: nothing here updates or deletes.
pub trait ArchiveStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist one search: a [`QueryRecord`] for `query` with `status` and the
  /// outcome's total, plus one [`QueryResult`] per entry in feed order.
  ///
  /// Parent and children are written atomically; on failure nothing is kept.
  fn archive<'a>(
    &'a self,
    query: &'a ComposedQuery,
    outcome: &'a SearchOutcome,
    status: u16,
  ) -> impl Future<Output = Result<QueryRecordWithResults, Self::Error>> + Send + 'a;

  /// Records whose timestamp falls inside `range`, in insertion order.
  fn list_queries(
    &self,
    range: TimeRange,
  ) -> impl Future<Output = Result<Vec<QueryRecord>, Self::Error>> + Send + '_;

  /// Results across all records, ascending by timestamp, windowed by `page`.
  fn list_results(
    &self,
    page: Page,
  ) -> impl Future<Output = Result<Vec<QueryResult>, Self::Error>> + Send + '_;
}
