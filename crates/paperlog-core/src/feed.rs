//! The `PaperFeed` trait and the parsed shape of a feed response.
//!
//! Implemented by `paperlog-feed` against the arXiv export API. The HTTP
//! layer only sees this abstraction, which keeps it testable without a
//! network.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, query::{ComposedQuery, SearchFilters}};

/// A single paper as listed by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
  /// Author names in feed order.
  pub authors:     Vec<String>,
  pub title:       String,
  /// Journal reference, absent when the feed omits it.
  pub journal_ref: Option<String>,
}

impl FeedEntry {
  /// Author names joined as stored: `"A. One, B. Two"`.
  pub fn joined_authors(&self) -> String { self.authors.join(", ") }
}

/// The successful result of one feed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
  /// HTTP status the feed answered with.
  pub status:        u16,
  /// Total matches reported by the feed, not the number of `entries`.
  pub total_results: u32,
  pub entries:       Vec<FeedEntry>,
}

/// Abstraction over the external paper feed.
///
/// A call is a single attempt: no retry, no caching.
pub trait PaperFeed: Send + Sync {
  /// Run `query` against the feed, asking for at most `max_results` entries.
  ///
  /// Fails with [`Error::UpstreamUnavailable`] on transport failure,
  /// [`Error::UpstreamError`] on a non-200 answer and [`Error::NoResults`]
  /// when the feed reports zero matches.
  fn fetch<'a>(
    &'a self,
    query: &'a ComposedQuery,
    max_results: u32,
  ) -> impl Future<Output = Result<SearchOutcome>> + Send + 'a;

  /// Compose `filters` and fetch them. Fails with [`Error::InvalidRequest`]
  /// before any network traffic when no filter is present.
  fn search<'a>(
    &'a self,
    filters: &'a SearchFilters,
  ) -> impl Future<Output = Result<(ComposedQuery, SearchOutcome)>> + Send + 'a {
    async move {
      let query = filters.compose()?;
      let outcome = self.fetch(&query, filters.max_results()).await?;
      if outcome.total_results == 0 {
        return Err(Error::NoResults);
      }
      Ok((query, outcome))
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use super::*;

  struct CannedFeed {
    total: u32,
    calls: AtomicUsize,
  }

  impl PaperFeed for CannedFeed {
    async fn fetch(&self, _query: &ComposedQuery, _max_results: u32) -> Result<SearchOutcome> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      Ok(SearchOutcome { status: 200, total_results: self.total, entries: vec![] })
    }
  }

  #[test]
  fn authors_are_comma_joined_in_order() {
    let entry = FeedEntry {
      authors:     vec!["Albert Einstein".into(), "Boris Podolsky".into(), "Nathan Rosen".into()],
      title:       "EPR".into(),
      journal_ref: None,
    };
    assert_eq!(entry.joined_authors(), "Albert Einstein, Boris Podolsky, Nathan Rosen");
  }

  #[tokio::test]
  async fn search_without_filters_never_fetches() {
    let feed = CannedFeed { total: 3, calls: AtomicUsize::new(0) };
    let err = feed.search(&SearchFilters::default()).await.unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));
    assert_eq!(feed.calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn zero_total_is_no_results() {
    let feed = CannedFeed { total: 0, calls: AtomicUsize::new(0) };
    let filters = SearchFilters::default().author("Nobody");
    let err = feed.search(&filters).await.unwrap_err();
    assert!(matches!(err, Error::NoResults));
    assert_eq!(feed.calls.load(Ordering::SeqCst), 1);
  }
}
