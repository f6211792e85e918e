//! Trusted-host guard against `Host` header spoofing.

use std::sync::Arc;

use axum::{
  extract::{Request, State},
  http::header,
  middleware::Next,
  response::{IntoResponse, Response},
};
use tracing::warn;

use crate::error::ApiError;

/// The set of `Host` values a server answers to.
#[derive(Debug, Clone)]
pub struct AllowedHosts {
  any:      bool,
  exact:    Vec<String>,
  /// Suffixes from `*.example.com` patterns, stored as `.example.com`.
  suffixes: Vec<String>,
}

impl AllowedHosts {
  pub fn new(patterns: &[String]) -> Self {
    let mut hosts = Self { any: false, exact: Vec::new(), suffixes: Vec::new() };
    for p in patterns {
      let p = p.trim().to_ascii_lowercase();
      if p == "*" {
        hosts.any = true;
      } else if let Some(suffix) = p.strip_prefix('*') {
        hosts.suffixes.push(suffix.to_owned());
      } else {
        hosts.exact.push(p);
      }
    }
    hosts
  }

  /// Whether `host` (a `Host` header value, port optional) is accepted.
  pub fn allows(&self, host: &str) -> bool {
    if self.any {
      return true;
    }
    let host = strip_port(host).to_ascii_lowercase();
    self.exact.iter().any(|h| *h == host)
      || self.suffixes.iter().any(|s| host.ends_with(s.as_str()))
  }
}

fn strip_port(host: &str) -> &str {
  if host.starts_with('[') {
    // IPv6 literal: keep through the closing bracket.
    return host.find(']').map_or(host, |end| &host[..=end]);
  }
  host.split_once(':').map_or(host, |(name, _)| name)
}

/// Middleware rejecting requests whose host is not allowed with 400.
pub async fn guard(
  State(hosts): State<Arc<AllowedHosts>>,
  req: Request,
  next: Next,
) -> Response {
  let host = req
    .headers()
    .get(header::HOST)
    .and_then(|v| v.to_str().ok())
    .or_else(|| req.uri().host())
    .unwrap_or_default();

  if hosts.allows(host) {
    next.run(req).await
  } else {
    warn!(host, "rejecting request for untrusted host");
    ApiError::BadRequest("Invalid host header".to_owned()).into_response()
  }
}
