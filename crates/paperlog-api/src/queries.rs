//! Handler for `GET /arxiv/queries`.
//!
//! | Param | Notes |
//! |-------|-------|
//! | `query_timestamp_start` | required, inclusive |
//! | `query_timestamp_end` | optional, inclusive |
//! | `download` | `true` returns `queries.csv` as an attachment |
//!
//! Timestamps are ISO 8601, with or without an offset. A timestamp without an
//! offset is taken as UTC.

use axum::{
  Json,
  extract::{Query, State, rejection::QueryRejection},
  http::header,
  response::{IntoResponse, Response},
};
use chrono::{DateTime, Datelike as _, NaiveDate, NaiveDateTime, Utc};
use paperlog_core::{
  feed::PaperFeed,
  record::QueryRecord,
  store::{ArchiveStore, TimeRange},
};
use serde::{
  Deserialize, Deserializer,
  de::{self, Unexpected},
};
use tracing::{info, warn};

use crate::{AppState, error::ApiError};

pub const CSV_FILENAME: &str = "queries.csv";

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub query_timestamp_start: String,
  pub query_timestamp_end:   Option<String>,
  #[serde(default, deserialize_with = "flag")]
  pub download:              bool,
}

/// Query-string boolean: `true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`,
/// `t`/`f` and `y`/`n`, in any case.
fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
  let raw = String::deserialize(d)?;
  match raw.trim().to_ascii_lowercase().as_str() {
    "true" | "1" | "yes" | "on" | "t" | "y" => Ok(true),
    "false" | "0" | "no" | "off" | "f" | "n" => Ok(false),
    _ => Err(de::Error::invalid_value(Unexpected::Str(&raw), &"a boolean")),
  }
}

/// `GET /arxiv/queries?query_timestamp_start=...[&query_timestamp_end=...][&download=true]`
pub async fn handler<S, F>(
  State(state): State<AppState<S, F>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Response, ApiError>
where
  S: ArchiveStore + 'static,
  F: PaperFeed + 'static,
{
  let Query(params) = params?;
  let start = parse_timestamp(&params.query_timestamp_start)?;
  let range = match params.query_timestamp_end.as_deref() {
    Some(end) => TimeRange::between(start, parse_timestamp(end)?),
    None => TimeRange::since(start),
  };

  info!(?range, download = params.download, "listing queries");
  let records = state
    .store
    .list_queries(range)
    .await
    .map_err(ApiError::store)?;

  if records.is_empty() {
    warn!(?range, "no queries in range");
    return Err(ApiError::NotFound(
      "No queries found in the specified range.".to_owned(),
    ));
  }

  if params.download {
    let csv = render_csv(&records)?;
    info!(rows = records.len(), "returning queries as csv");
    Ok(
      (
        [
          (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
          (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={CSV_FILENAME}"),
          ),
        ],
        csv,
      )
        .into_response(),
    )
  } else {
    Ok(Json(records).into_response())
  }
}

/// Parse an ISO 8601 timestamp: RFC 3339, a naive date-time, or a bare date.
///
/// The UTC year must be within `0..=9999`; stored timestamps compare as
/// fixed-width text.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ApiError> {
  let raw = raw.trim();
  let invalid = || ApiError::Unprocessable(format!("invalid timestamp: {raw:?}"));

  let parsed = match DateTime::parse_from_rfc3339(raw) {
    Ok(dt) => dt.with_timezone(&Utc),
    Err(_) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
      .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
      .or_else(|_| {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(|d| d.and_time(chrono::NaiveTime::MIN))
      })
      .map(|naive| naive.and_utc())
      .map_err(|_| invalid())?,
  };

  if !(0..=9999).contains(&parsed.year()) {
    return Err(invalid());
  }
  Ok(parsed)
}

/// Render records as CSV with the header `id,query,timestamp,status,num_results`.
///
/// Fields go through the same serde impls as the JSON rendering, so both
/// forms agree value for value.
pub fn render_csv(records: &[QueryRecord]) -> Result<Vec<u8>, ApiError> {
  let mut writer = csv::Writer::from_writer(Vec::new());
  for record in records {
    writer.serialize(record)?;
  }
  let bytes = writer
    .into_inner()
    .map_err(|e| csv::Error::from(e.into_error()))?;
  Ok(bytes)
}

#[cfg(test)]
mod tests {
  use chrono::{Datelike, TimeZone};

  use super::*;

  #[test]
  fn accepts_offset_and_naive_forms() {
    let expected = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(parse_timestamp("2023-01-01T00:00:00").unwrap(), expected);
    assert_eq!(parse_timestamp("2023-01-01T00:00:00Z").unwrap(), expected);
    assert_eq!(parse_timestamp("2023-01-01T01:00:00+01:00").unwrap(), expected);
    assert_eq!(parse_timestamp("2023-01-01 00:00:00").unwrap(), expected);
    assert_eq!(parse_timestamp("2023-01-01").unwrap(), expected);

    let frac = parse_timestamp("2023-01-31T23:59:59.250").unwrap();
    assert_eq!(frac.timestamp_subsec_millis(), 250);
  }

  #[test]
  fn rejects_garbage() {
    for raw in [
      "invalid-timestamp",
      "",
      "2023-13-01T00:00:00",
      "yesterday",
      "+10000-01-01T00:00:00",
      "-0001-01-01T00:00:00",
      "9999-12-31T23:00:00-05:00",
    ] {
      assert!(
        matches!(parse_timestamp(raw), Err(ApiError::Unprocessable(_))),
        "{raw:?} should be rejected"
      );
    }
  }

  #[test]
  fn edge_years_are_accepted() {
    assert_eq!(parse_timestamp("9999-12-31T23:59:59Z").unwrap().year(), 9999);
    assert_eq!(parse_timestamp("0001-01-01").unwrap().year(), 1);
  }

  #[test]
  fn csv_header_and_rows() {
    let ts = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
    let records = [
      QueryRecord {
        id: 1,
        query: "au:Einstein".into(),
        timestamp: ts,
        status: 200,
        num_results: 10,
      },
      QueryRecord {
        id: 2,
        query: "au:Doe, John AND ti:Quantum".into(),
        timestamp: ts,
        status: 200,
        num_results: 5,
      },
    ];

    let csv = String::from_utf8(render_csv(&records).unwrap()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "id,query,timestamp,status,num_results");
    assert_eq!(lines[1], "1,au:Einstein,2024-06-30T12:00:00Z,200,10");
    // Commas inside a field are quoted.
    assert_eq!(lines[2], "2,\"au:Doe, John AND ti:Quantum\",2024-06-30T12:00:00Z,200,5");
    assert_eq!(lines.len(), 3);
  }
}
