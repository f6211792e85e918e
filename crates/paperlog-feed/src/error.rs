//! Error type for `paperlog-feed`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("xml error: {0}")]
  Xml(#[from] quick_xml::Error),

  #[error("document has no <feed> element")]
  MissingFeed,

  #[error("failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for paperlog_core::Error {
  fn from(e: Error) -> Self { paperlog_core::Error::MalformedFeed(e.to_string()) }
}
