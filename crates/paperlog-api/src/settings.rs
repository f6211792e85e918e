//! Runtime server configuration.
//!
//! Read from an optional TOML file, overridden by `PAPERLOG_*` environment
//! variables. List-valued keys accept comma-separated values from the
//! environment, e.g. `PAPERLOG_ALLOWED_HOSTS=localhost,api.example.com`.

use std::path::{Path, PathBuf};

use paperlog_feed::DEFAULT_FEED_URL;
use serde::Deserialize;

const ENV_PREFIX: &str = "PAPERLOG";

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:          String,
  #[serde(default = "default_port")]
  pub port:          u16,
  /// SQLite file; a leading `~/` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path:    PathBuf,
  /// arXiv-compatible query endpoint.
  #[serde(default = "default_feed_url")]
  pub feed_url:      String,
  /// Origins allowed by CORS. Empty disables cross-origin access; `*` allows
  /// any origin.
  #[serde(default)]
  pub cors_origins:  Vec<String>,
  /// Accepted `Host` header values. `*` accepts any host, `*.example.com`
  /// accepts subdomains.
  #[serde(default = "default_allowed_hosts")]
  pub allowed_hosts: Vec<String>,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8000 }

fn default_store_path() -> PathBuf { PathBuf::from("paperlog.sqlite3") }

fn default_feed_url() -> String { DEFAULT_FEED_URL.to_owned() }

fn default_allowed_hosts() -> Vec<String> { vec!["*".to_owned()] }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:          default_host(),
      port:          default_port(),
      store_path:    default_store_path(),
      feed_url:      default_feed_url(),
      cors_origins:  Vec::new(),
      allowed_hosts: default_allowed_hosts(),
    }
  }
}

impl ServerConfig {
  /// Load from `path` (may be absent) layered under the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix(ENV_PREFIX)
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("cors_origins")
          .with_list_parse_key("allowed_hosts"),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}
