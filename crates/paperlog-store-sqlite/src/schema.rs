//! SQL schema for the paperlog SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per executed search. Never updated.
CREATE TABLE IF NOT EXISTS query_records (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    query       TEXT    NOT NULL,
    timestamp   TEXT    NOT NULL,   -- RFC 3339 UTC, fixed microsecond width
    status      INTEGER NOT NULL,
    num_results INTEGER NOT NULL CHECK (num_results >= 0)
);

-- One row per feed entry of a search.
CREATE TABLE IF NOT EXISTS query_results (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    author          TEXT    NOT NULL,
    title           TEXT    NOT NULL,
    journal         TEXT,
    query_record_id INTEGER NOT NULL
                    REFERENCES query_records(id) ON DELETE CASCADE,
    timestamp       TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS query_records_query_idx     ON query_records(query);
CREATE INDEX IF NOT EXISTS query_records_timestamp_idx ON query_records(timestamp);
CREATE INDEX IF NOT EXISTS query_results_timestamp_idx ON query_results(timestamp);
CREATE INDEX IF NOT EXISTS query_results_record_idx    ON query_results(query_record_id);

PRAGMA user_version = 1;
";
