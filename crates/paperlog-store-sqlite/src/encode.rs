//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with exactly six fractional
//! digits and a `Z` suffix. The fixed width keeps lexicographic order equal to
//! chronological order, so range filters and `ORDER BY` work on the text.

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound as _, Utc};
use paperlog_core::record::{QueryRecord, QueryResult};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Round up to the next whole microsecond. Inclusive lower bounds go through
/// this so that sub-microsecond input never widens a range.
pub fn ceil_micros(dt: DateTime<Utc>) -> DateTime<Utc> {
  let floor = dt.trunc_subsecs(6);
  if floor < dt {
    floor.checked_add_signed(Duration::microseconds(1)).unwrap_or(floor)
  } else {
    floor
  }
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const QUERY_RECORD_COLUMNS: &str = "id, query, timestamp, status, num_results";

pub const QUERY_RESULT_COLUMNS: &str =
  "id, author, title, journal, query_record_id, timestamp";

/// Raw values read directly from a `query_records` row.
pub struct RawQueryRecord {
  pub id:          i64,
  pub query:       String,
  pub timestamp:   String,
  pub status:      u16,
  pub num_results: u32,
}

impl RawQueryRecord {
  /// Read a row selected with [`QUERY_RECORD_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      query:       row.get(1)?,
      timestamp:   row.get(2)?,
      status:      row.get(3)?,
      num_results: row.get(4)?,
    })
  }

  pub fn into_record(self) -> Result<QueryRecord> {
    Ok(QueryRecord {
      id:          self.id,
      query:       self.query,
      timestamp:   decode_dt(&self.timestamp)?,
      status:      self.status,
      num_results: self.num_results,
    })
  }
}

/// Raw values read directly from a `query_results` row.
pub struct RawQueryResult {
  pub id:              i64,
  pub author:          String,
  pub title:           String,
  pub journal:         Option<String>,
  pub query_record_id: i64,
  pub timestamp:       String,
}

impl RawQueryResult {
  /// Read a row selected with [`QUERY_RESULT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      author:          row.get(1)?,
      title:           row.get(2)?,
      journal:         row.get(3)?,
      query_record_id: row.get(4)?,
      timestamp:       row.get(5)?,
    })
  }

  pub fn into_result(self) -> Result<QueryResult> {
    Ok(QueryResult {
      id:              self.id,
      author:          self.author,
      title:           self.title,
      journal:         self.journal,
      query_record_id: self.query_record_id,
      timestamp:       decode_dt(&self.timestamp)?,
    })
  }
}
