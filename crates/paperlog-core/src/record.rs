//! Persisted records: one [`QueryRecord`] per executed search, owning one
//! [`QueryResult`] per feed entry.
//!
//! Both are written once and never updated.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::query::ComposedQuery;

/// Store-assigned row identifier.
pub type RecordId = i64;

/// The current time at the precision the store keeps (microseconds), so a
/// value handed back to a caller compares equal to the one read back later.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

/// One executed search.
///
/// The field order is also the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRecord {
  pub id:          RecordId,
  pub query:       String,
  pub timestamp:   DateTime<Utc>,
  /// HTTP status of the outbound feed call.
  pub status:      u16,
  /// Total matches reported by the feed; may exceed the stored results.
  pub num_results: u32,
}

/// One feed entry stored under a [`QueryRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
  pub id:              RecordId,
  /// Author names in feed order, joined with `", "`.
  pub author:          String,
  pub title:           String,
  pub journal:         Option<String>,
  pub query_record_id: RecordId,
  pub timestamp:       DateTime<Utc>,
}

/// A [`QueryRecord`] together with its results, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRecordWithResults {
  #[serde(flatten)]
  pub record:  QueryRecord,
  pub results: Vec<QueryResult>,
}

/// Input for inserting a bare [`QueryRecord`].
#[derive(Debug, Clone)]
pub struct NewQueryRecord {
  pub query:       ComposedQuery,
  pub timestamp:   DateTime<Utc>,
  pub status:      u16,
  pub num_results: u32,
}

impl NewQueryRecord {
  pub fn new(query: ComposedQuery, status: u16, num_results: u32) -> Self {
    Self { query, timestamp: now(), status, num_results }
  }
}

/// Input for inserting a single [`QueryResult`].
#[derive(Debug, Clone)]
pub struct NewQueryResult {
  pub author:          String,
  pub title:           String,
  pub journal:         Option<String>,
  pub query_record_id: RecordId,
  /// Defaults to the insertion time.
  pub timestamp:       Option<DateTime<Utc>>,
}
