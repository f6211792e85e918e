//! HTTP client for the arXiv export API.

use paperlog_core::{
  Error as CoreError,
  feed::{PaperFeed, SearchOutcome},
  query::ComposedQuery,
};
use reqwest::{Client, StatusCode};
use tracing::{debug, error, info};

use crate::{atom, error::Error};

/// The public arXiv query endpoint.
pub const DEFAULT_FEED_URL: &str = "https://export.arxiv.org/api/query";

/// Issues search requests against an arXiv-compatible endpoint.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based. Requests
/// use the transport's default timeout and are never retried.
#[derive(Clone)]
pub struct FeedClient {
  client:   Client,
  base_url: String,
}

impl FeedClient {
  pub fn new(base_url: impl Into<String>) -> crate::Result<Self> {
    let client = Client::builder()
      .user_agent(concat!("paperlog/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(Error::Client)?;
    Ok(Self { client, base_url: base_url.into() })
  }

  pub fn base_url(&self) -> &str { &self.base_url }
}

impl PaperFeed for FeedClient {
  async fn fetch(
    &self,
    query: &ComposedQuery,
    max_results: u32,
  ) -> paperlog_core::Result<SearchOutcome> {
    let max_results = max_results.to_string();
    info!(query = %query, max_results = %max_results, url = %self.base_url, "querying feed");

    let resp = self
      .client
      .get(&self.base_url)
      .query(&[
        ("search_query", query.as_str()),
        ("max_results", max_results.as_str()),
        ("sortBy", "relevance"),
        ("sortOrder", "descending"),
      ])
      .send()
      .await
      .map_err(|e| {
        error!(error = %e, "feed not available");
        CoreError::UpstreamUnavailable(e.to_string())
      })?;

    let status = resp.status();
    if status != StatusCode::OK {
      error!(%status, query = %query, "feed answered with an error status");
      return Err(CoreError::UpstreamError(status.as_u16()));
    }

    let body = resp.bytes().await.map_err(|e| {
      error!(error = %e, "feed response body could not be read");
      CoreError::UpstreamUnavailable(e.to_string())
    })?;

    let page = atom::parse(&body)?;
    debug!(title = ?page.title, "feed parsed");
    info!(
      total = page.total_results,
      entries = page.entries.len(),
      "feed returned results"
    );

    Ok(SearchOutcome {
      status:        status.as_u16(),
      total_results: page.total_results,
      entries:       page.entries,
    })
  }
}

#[cfg(test)]
mod tests {
  use mockito::{Matcher, Server};
  use paperlog_core::query::SearchFilters;

  use super::*;

  const EINSTEIN: &str = include_str!("../testdata/einstein.atom");

  fn client_for(server: &Server) -> FeedClient {
    FeedClient::new(format!("{}/api/query", server.url())).unwrap()
  }

  #[tokio::test]
  async fn sends_composed_query_and_parses_feed() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", "/api/query")
      .match_query(Matcher::AllOf(vec![
        Matcher::UrlEncoded("search_query".into(), "au:Einstein AND ti:Relativity".into()),
        Matcher::UrlEncoded("max_results".into(), "2".into()),
        Matcher::UrlEncoded("sortBy".into(), "relevance".into()),
        Matcher::UrlEncoded("sortOrder".into(), "descending".into()),
      ]))
      .with_status(200)
      .with_header("content-type", "application/atom+xml; charset=utf-8")
      .with_body(EINSTEIN)
      .create_async()
      .await;

    let filters = SearchFilters {
      max_query_results: Some(2),
      ..SearchFilters::default().author("Einstein").title("Relativity")
    };
    let (query, outcome) = client_for(&server).search(&filters).await.unwrap();

    mock.assert_async().await;
    assert_eq!(query.as_str(), "au:Einstein AND ti:Relativity");
    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.total_results, 137);
    assert_eq!(outcome.entries.len(), 2);
    assert_eq!(outcome.entries[0].joined_authors(), "A. Einstein, B. Podolsky, N. Rosen");
  }

  #[tokio::test]
  async fn default_max_results_is_eight() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", "/api/query")
      .match_query(Matcher::UrlEncoded("max_results".into(), "8".into()))
      .with_status(200)
      .with_body(EINSTEIN)
      .create_async()
      .await;

    let filters = SearchFilters::default().author("Einstein");
    client_for(&server).search(&filters).await.unwrap();
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn empty_filters_make_no_request() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", Matcher::Any)
      .expect(0)
      .create_async()
      .await;

    let filters = SearchFilters::default().author("").title("").journal("");
    let err = client_for(&server).search(&filters).await.unwrap_err();

    assert!(matches!(err, CoreError::InvalidRequest(_)));
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn error_status_is_passed_through() {
    let mut server = Server::new_async().await;
    server
      .mock("GET", "/api/query")
      .match_query(Matcher::Any)
      .with_status(503)
      .create_async()
      .await;

    let filters = SearchFilters::default().author("Einstein");
    let err = client_for(&server).search(&filters).await.unwrap_err();
    assert!(matches!(err, CoreError::UpstreamError(503)));
  }

  #[tokio::test]
  async fn zero_total_is_no_results() {
    let mut server = Server::new_async().await;
    server
      .mock("GET", "/api/query")
      .match_query(Matcher::Any)
      .with_status(200)
      .with_body(
        r#"<feed xmlns="http://www.w3.org/2005/Atom"
             xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">
             <opensearch:totalResults>0</opensearch:totalResults>
           </feed>"#,
      )
      .create_async()
      .await;

    let filters = SearchFilters::default().author("Nobody");
    let err = client_for(&server).search(&filters).await.unwrap_err();
    assert!(matches!(err, CoreError::NoResults));
  }

  #[tokio::test]
  async fn non_feed_body_is_malformed() {
    let mut server = Server::new_async().await;
    server
      .mock("GET", "/api/query")
      .match_query(Matcher::Any)
      .with_status(200)
      .with_body(r#"{"feed": {"opensearch_totalresults": "0", "entries": []}}"#)
      .create_async()
      .await;

    let filters = SearchFilters::default().author("Nobody");
    let err = client_for(&server).search(&filters).await.unwrap_err();
    assert!(matches!(err, CoreError::MalformedFeed(_)));
  }

  #[tokio::test]
  async fn unreachable_feed_is_unavailable() {
    // Nothing listens on the discard port.
    let client = FeedClient::new("http://127.0.0.1:9/api/query").unwrap();
    let filters = SearchFilters::default().author("Einstein");
    let err = client.search(&filters).await.unwrap_err();
    assert!(matches!(err, CoreError::UpstreamUnavailable(_)));
  }
}
