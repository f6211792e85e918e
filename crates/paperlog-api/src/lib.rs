//! JSON REST API for paperlog.
//!
//! Exposes an axum [`Router`] backed by any [`ArchiveStore`] and
//! [`PaperFeed`]. Routes:
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `GET`  | `/health` | liveness check |
//! | `POST` | `/arxiv/search` | [`search::handler`] |
//! | `GET`  | `/arxiv/queries` | [`queries::handler`] |
//! | `GET`  | `/arxiv/results` | [`results::handler`] |

pub mod error;
pub mod host;
pub mod queries;
pub mod results;
pub mod search;
pub mod settings;

use std::sync::Arc;

use axum::{
  Json, Router,
  http::HeaderValue,
  middleware,
  routing::{get, post},
};
use paperlog_core::{feed::PaperFeed, store::ArchiveStore};
use serde_json::{Value, json};
use tower_http::{
  cors::{AllowOrigin, Any, CorsLayer},
  trace::TraceLayer,
};
use tracing::warn;

pub use error::ApiError;
pub use settings::ServerConfig;

use host::AllowedHosts;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, F> {
  pub store: Arc<S>,
  pub feed:  Arc<F>,
}

// Manual impl: neither `S` nor `F` has to be `Clone` behind the `Arc`.
impl<S, F> Clone for AppState<S, F> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), feed: Arc::clone(&self.feed) }
  }
}

impl<S, F> AppState<S, F> {
  pub fn new(store: S, feed: F) -> Self {
    Self { store: Arc::new(store), feed: Arc::new(feed) }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application router.
///
/// Requests pass the trace layer, then CORS, then the trusted-host guard
/// before reaching a handler.
pub fn router<S, F>(state: AppState<S, F>, config: &ServerConfig) -> Router
where
  S: ArchiveStore + 'static,
  F: PaperFeed + 'static,
{
  let arxiv = Router::new()
    .route("/search",  post(search::handler::<S, F>))
    .route("/queries", get(queries::handler::<S, F>))
    .route("/results", get(results::handler::<S, F>));

  let hosts = Arc::new(AllowedHosts::new(&config.allowed_hosts));

  Router::new()
    .route("/health", get(health))
    .nest("/arxiv", arxiv)
    .with_state(state)
    .layer(middleware::from_fn_with_state(hosts, host::guard))
    .layer(cors_layer(&config.cors_origins))
    .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

/// CORS for the configured origins. `*` allows any origin; an empty list
/// allows none.
fn cors_layer(origins: &[String]) -> CorsLayer {
  let allow = if origins.iter().any(|o| o.trim() == "*") {
    AllowOrigin::any()
  } else {
    let list: Vec<HeaderValue> = origins
      .iter()
      .filter_map(|o| {
        let o = o.trim().trim_end_matches('/');
        HeaderValue::from_str(o)
          .inspect_err(|_| warn!(origin = o, "ignoring unparseable CORS origin"))
          .ok()
      })
      .collect();
    AllowOrigin::list(list)
  };

  CorsLayer::new()
    .allow_origin(allow)
    .allow_methods(Any)
    .allow_headers(Any)
}
