//! Search filters and the composed query expression sent to the feed.
//!
//! A search names up to three fields. Each present field is tagged with its
//! feed prefix and the tagged terms are joined with the `AND` connective, in
//! the fixed order author, title, journal:
//!
//! ```text
//! { author: "Einstein", journal: "Nature" }  →  au:Einstein AND jr:Nature
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of entries requested from the feed when the caller does not say.
pub const DEFAULT_MAX_RESULTS: u32 = 8;

const CONNECTIVE: &str = " AND ";

/// Caller-supplied search terms, as accepted by `POST /arxiv/search`.
///
/// Empty and whitespace-only strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
  pub author:            Option<String>,
  pub title:             Option<String>,
  pub journal:           Option<String>,
  /// Upper bound on entries fetched from the feed. `None` and `0` both mean
  /// [`DEFAULT_MAX_RESULTS`].
  pub max_query_results: Option<u32>,
}

impl SearchFilters {
  pub fn author(mut self, author: impl Into<String>) -> Self {
    self.author = Some(author.into());
    self
  }

  pub fn title(mut self, title: impl Into<String>) -> Self {
    self.title = Some(title.into());
    self
  }

  pub fn journal(mut self, journal: impl Into<String>) -> Self {
    self.journal = Some(journal.into());
    self
  }

  pub fn max_results(&self) -> u32 {
    match self.max_query_results {
      Some(0) | None => DEFAULT_MAX_RESULTS,
      Some(n) => n,
    }
  }

  /// Build the composed expression, or fail with
  /// [`Error::InvalidRequest`] when no field is present.
  pub fn compose(&self) -> Result<ComposedQuery> {
    let terms: Vec<String> = [
      ("au", &self.author),
      ("ti", &self.title),
      ("jr", &self.journal),
    ]
    .into_iter()
    .filter_map(|(tag, value)| {
      value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| format!("{tag}:{v}"))
    })
    .collect();

    if terms.is_empty() {
      return Err(Error::InvalidRequest(
        "At least one of the query parameters (author, title, journal) must be provided."
          .to_owned(),
      ));
    }

    Ok(ComposedQuery(terms.join(CONNECTIVE)))
  }
}

/// A field-tagged, AND-joined search expression. Only obtainable through
/// [`SearchFilters::compose`] or [`ComposedQuery::from_raw`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComposedQuery(String);

impl ComposedQuery {
  /// Wrap an already-composed expression, e.g. one read back from storage.
  pub fn from_raw(raw: impl Into<String>) -> Self { Self(raw.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ComposedQuery {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn single_author() {
    let q = SearchFilters::default().author("Einstein").compose().unwrap();
    assert_eq!(q.as_str(), "au:Einstein");
  }

  #[test]
  fn fields_are_joined_in_fixed_order() {
    let q = SearchFilters::default()
      .journal("Nature")
      .title("Quantum Computing")
      .author("John Doe")
      .compose()
      .unwrap();
    assert_eq!(q.as_str(), "au:John Doe AND ti:Quantum Computing AND jr:Nature");
  }

  #[test]
  fn empty_strings_are_ignored() {
    let q = SearchFilters::default()
      .author("")
      .title("Relativity")
      .journal("   ")
      .compose()
      .unwrap();
    assert_eq!(q.as_str(), "ti:Relativity");
  }

  #[test]
  fn no_filters_is_invalid() {
    let err = SearchFilters::default()
      .author("")
      .title("")
      .journal("")
      .compose()
      .unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));
  }

  #[test]
  fn max_results_defaults_to_eight() {
    assert_eq!(SearchFilters::default().max_results(), 8);

    let zero = SearchFilters { max_query_results: Some(0), ..Default::default() };
    assert_eq!(zero.max_results(), 8);

    let three = SearchFilters { max_query_results: Some(3), ..Default::default() };
    assert_eq!(three.max_results(), 3);
  }

  #[test]
  fn deserialises_request_body() {
    let body = r#"{"author":"Einstein","title":"","journal":null,"max_query_results":8}"#;
    let filters: SearchFilters = serde_json::from_str(body).unwrap();
    assert_eq!(filters.author.as_deref(), Some("Einstein"));
    assert_eq!(filters.title.as_deref(), Some(""));
    assert_eq!(filters.journal, None);
    assert_eq!(filters.compose().unwrap().as_str(), "au:Einstein");
  }
}
