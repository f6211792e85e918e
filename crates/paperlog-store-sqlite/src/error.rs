//! Error type for `paperlog-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A result was inserted for a query record that does not exist.
  #[error("query record not found: {0}")]
  QueryRecordNotFound(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
