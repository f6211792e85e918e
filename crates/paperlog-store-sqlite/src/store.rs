//! [`SqliteStore`], the SQLite implementation of [`ArchiveStore`].

use std::path::Path;

use chrono::SubsecRound as _;
use rusqlite::OptionalExtension as _;
use tracing::info;

use paperlog_core::{
  feed::SearchOutcome,
  query::ComposedQuery,
  record::{
    NewQueryRecord, NewQueryResult, QueryRecord, QueryRecordWithResults, QueryResult,
    RecordId, now,
  },
  store::{ArchiveStore, Page, TimeRange},
};

use crate::{
  Error, Result,
  encode::{
    QUERY_RECORD_COLUMNS, QUERY_RESULT_COLUMNS, RawQueryRecord, RawQueryResult, ceil_micros,
    encode_dt,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A paperlog archive backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a bare query record with a caller-chosen timestamp.
  pub async fn insert_query_record(&self, input: NewQueryRecord) -> Result<QueryRecord> {
    let timestamp = input.timestamp.trunc_subsecs(6);
    let query     = input.query.as_str().to_owned();
    let at_str    = encode_dt(timestamp);
    let status    = input.status;
    let num       = input.num_results;

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO query_records (query, timestamp, status, num_results)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![query, at_str, status, num],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(QueryRecord {
      id,
      query: input.query.as_str().to_owned(),
      timestamp,
      status,
      num_results: num,
    })
  }

  /// Insert a single result under an existing query record. The timestamp
  /// defaults to now.
  pub async fn insert_result(&self, input: NewQueryResult) -> Result<QueryResult> {
    let timestamp = input.timestamp.map_or_else(now, |t| t.trunc_subsecs(6));
    let record_id = input.query_record_id;
    let at_str    = encode_dt(timestamp);
    let author    = input.author.clone();
    let title     = input.title.clone();
    let journal   = input.journal.clone();

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let exists = conn
          .query_row(
            "SELECT 1 FROM query_records WHERE id = ?1",
            rusqlite::params![record_id],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !exists {
          return Ok(None);
        }

        conn.execute(
          "INSERT INTO query_results (author, title, journal, query_record_id, timestamp)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![author, title, journal, record_id, at_str],
        )?;
        Ok(Some(conn.last_insert_rowid()))
      })
      .await?;

    let id = id.ok_or(Error::QueryRecordNotFound(record_id))?;
    Ok(QueryResult {
      id,
      author: input.author,
      title: input.title,
      journal: input.journal,
      query_record_id: record_id,
      timestamp,
    })
  }

  /// Retrieve a query record with its results, or `None` if not found.
  pub async fn get_query(&self, id: RecordId) -> Result<Option<QueryRecordWithResults>> {
    let raw: Option<(RawQueryRecord, Vec<RawQueryResult>)> = self
      .conn
      .call(move |conn| {
        let record = conn
          .query_row(
            &format!("SELECT {QUERY_RECORD_COLUMNS} FROM query_records WHERE id = ?1"),
            rusqlite::params![id],
            RawQueryRecord::from_row,
          )
          .optional()?;
        let Some(record) = record else {
          return Ok(None);
        };

        let mut stmt = conn.prepare(&format!(
          "SELECT {QUERY_RESULT_COLUMNS} FROM query_results
           WHERE query_record_id = ?1
           ORDER BY id"
        ))?;
        let results = stmt
          .query_map(rusqlite::params![id], RawQueryResult::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some((record, results)))
      })
      .await?;

    let Some((record, results)) = raw else {
      return Ok(None);
    };
    Ok(Some(QueryRecordWithResults {
      record:  record.into_record()?,
      results: results
        .into_iter()
        .map(RawQueryResult::into_result)
        .collect::<Result<_>>()?,
    }))
  }
}

// ─── ArchiveStore impl ───────────────────────────────────────────────────────

impl ArchiveStore for SqliteStore {
  type Error = Error;

  async fn archive(
    &self,
    query: &ComposedQuery,
    outcome: &SearchOutcome,
    status: u16,
  ) -> Result<QueryRecordWithResults> {
    let timestamp   = now();
    let at_str      = encode_dt(timestamp);
    let query       = query.as_str().to_owned();
    let num_results = outcome.total_results;
    let rows: Vec<(String, String, Option<String>)> = outcome
      .entries
      .iter()
      .map(|e| (e.joined_authors(), e.title.clone(), e.journal_ref.clone()))
      .collect();

    // Parent and children share one transaction: the parent id is read back
    // before the children are written, and a failure leaves nothing behind.
    let archived = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        tx.execute(
          "INSERT INTO query_records (query, timestamp, status, num_results)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![query, at_str, status, num_results],
        )?;
        let record_id = tx.last_insert_rowid();

        let mut results = Vec::with_capacity(rows.len());
        {
          let mut stmt = tx.prepare(
            "INSERT INTO query_results (author, title, journal, query_record_id, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
          )?;
          for (author, title, journal) in rows {
            stmt.execute(rusqlite::params![author, title, journal, record_id, at_str])?;
            results.push(QueryResult {
              id: tx.last_insert_rowid(),
              author,
              title,
              journal,
              query_record_id: record_id,
              timestamp,
            });
          }
        }

        tx.commit()?;

        Ok(QueryRecordWithResults {
          record: QueryRecord { id: record_id, query, timestamp, status, num_results },
          results,
        })
      })
      .await?;

    info!(
      id = archived.record.id,
      query = %archived.record.query,
      results = archived.results.len(),
      "query record archived"
    );
    Ok(archived)
  }

  async fn list_queries(&self, range: TimeRange) -> Result<Vec<QueryRecord>> {
    let start_str = encode_dt(ceil_micros(range.start));
    let end_str   = range.end.map(encode_dt);

    let raws: Vec<RawQueryRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {QUERY_RECORD_COLUMNS} FROM query_records
           WHERE timestamp >= ?1
             AND (?2 IS NULL OR timestamp <= ?2)
           ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![start_str, end_str], RawQueryRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawQueryRecord::into_record).collect()
  }

  async fn list_results(&self, page: Page) -> Result<Vec<QueryResult>> {
    let limit  = page.limit();
    let offset = page.offset();

    let raws: Vec<RawQueryResult> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {QUERY_RESULT_COLUMNS} FROM query_results
           ORDER BY timestamp, id
           LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit, offset], RawQueryResult::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawQueryResult::into_result).collect()
  }
}
