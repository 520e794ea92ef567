//! Global configuration parsing, validation, and environment overrides.

use std::env;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::{AppError, Result};

/// Environment variable overriding [`GlobalConfig::db_path`].
pub const DB_PATH_ENV: &str = "TODO_SYNC_DB_PATH";

/// Environment variable overriding [`ClientConfig::base_url`].
pub const BASE_URL_ENV: &str = "TODO_SYNC_BASE_URL";

/// Settings used by the sync client (`todo-sync-ctl`).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ClientConfig {
    /// Root URL of the task server, without the `/api/todos` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Upper bound on a single HTTP request, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Period between deadline scans, in seconds.
    #[serde(default = "default_scan_seconds")]
    pub deadline_scan_seconds: u64,
    /// Whether deadline alerts are delivered; `false` drops them silently.
    #[serde(default = "default_true")]
    pub alerts_enabled: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_seconds: default_request_timeout(),
            deadline_scan_seconds: default_scan_seconds(),
            alerts_enabled: true,
        }
    }
}

impl ClientConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Deadline scan interval as a [`Duration`].
    #[must_use]
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.deadline_scan_seconds)
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:3000".into()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_scan_seconds() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_db_path() -> PathBuf {
    PathBuf::from("todos.db")
}

fn default_http_host() -> IpAddr {
    IpAddr::from([127, 0, 0, 1])
}

fn default_http_port() -> u16 {
    3000
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// `SQLite` database file; `:memory:` keeps everything in RAM.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Interface the REST server binds to.
    #[serde(default = "default_http_host")]
    pub http_host: IpAddr,
    /// Port for the REST server; 0 asks the OS for an ephemeral port.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Directory of browser UI assets served as a fallback route.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
    /// Sync client settings.
    #[serde(default)]
    pub client: ClientConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            http_host: default_http_host(),
            http_port: default_http_port(),
            static_dir: None,
            client: ClientConfig::default(),
        }
    }
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Load from `path` when given, otherwise start from defaults, then
    /// apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` on unreadable or invalid configuration.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => {
                info!("no config file given; using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string and validate it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Replace file values with `TODO_SYNC_DB_PATH` / `TODO_SYNC_BASE_URL`
    /// when those variables are set and non-empty.
    pub fn apply_env_overrides(&mut self) {
        if let Some(db_path) = non_empty_env(DB_PATH_ENV) {
            self.db_path = PathBuf::from(db_path);
        }
        if let Some(base_url) = non_empty_env(BASE_URL_ENV) {
            self.client.base_url = base_url;
        }
    }

    /// Point the sync client at `base_url`, e.g. from a command-line flag.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `base_url` is not an http(s) URL; the
    /// current value is kept.
    pub fn override_base_url(&mut self, base_url: impl Into<String>) -> Result<()> {
        let base_url = base_url.into();
        check_base_url(&base_url)?;
        self.client.base_url = base_url;
        Ok(())
    }

    /// Socket address the REST server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http_host, self.http_port)
    }

    /// Whether the database lives only in memory.
    #[must_use]
    pub fn is_memory_db(&self) -> bool {
        self.db_path.as_os_str() == ":memory:"
    }

    fn validate(&self) -> Result<()> {
        if self.db_path.as_os_str().is_empty() {
            return Err(AppError::Config("db_path must not be empty".into()));
        }

        if self.client.request_timeout_seconds == 0 {
            return Err(AppError::Config(
                "client.request_timeout_seconds must be greater than zero".into(),
            ));
        }

        if self.client.deadline_scan_seconds == 0 {
            return Err(AppError::Config(
                "client.deadline_scan_seconds must be greater than zero".into(),
            ));
        }

        check_base_url(&self.client.base_url)
    }
}

fn check_base_url(url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        return Ok(());
    }
    Err(AppError::Config(format!(
        "client.base_url must be an http(s) URL, got '{url}'"
    )))
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
