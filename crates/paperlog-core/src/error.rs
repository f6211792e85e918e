//! Error types for `paperlog-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Caller input violates a precondition (no filters, bad pagination).
  #[error("{0}")]
  InvalidRequest(String),

  /// The feed could not be reached at all.
  #[error("feed unavailable: {0}")]
  UpstreamUnavailable(String),

  /// The feed answered with a non-success status.
  #[error("feed returned status {0}")]
  UpstreamError(u16),

  /// The feed answered, but its document could not be read.
  #[error("malformed feed: {0}")]
  MalformedFeed(String),

  /// The feed reported a total of zero matches.
  #[error("no results found")]
  NoResults,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
