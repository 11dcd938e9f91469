mod logging;

pub use logging::LoggingConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, WatchError};
use crate::view::DisplayZone;

/// Environment variable overriding `api.base_url`.
pub const BASE_URL_ENV: &str = "QUEUEWATCH_BASE_URL";

/// Root configuration for queuewatch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Job API location.
    #[serde(default)]
    pub api: ApiConfig,

    /// Polling schedule.
    #[serde(default)]
    pub poll: PollConfig,

    /// Display options.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl WatchConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| WatchError::Config(format!("Failed to read config file: {}", e)))?;

        Self::parse_toml(&content)
    }

    /// Load configuration from `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string.
    pub fn parse_toml(content: &str) -> Result<Self> {
        // Substitute environment variables
        let content = substitute_env_vars(content);

        toml::from_str(&content)
            .map_err(|e| WatchError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Apply `QUEUEWATCH_BASE_URL` if set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.base_url = url;
            }
        }
    }

    /// Reject settings the poller cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.poll.interval_ms == 0 {
            return Err(WatchError::Config(
                "poll.interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.api.jobs_limit == 0 {
            return Err(WatchError::Config(
                "api.jobs_limit must be greater than zero".to_string(),
            ));
        }
        if self.api.request_timeout_ms == Some(0) {
            return Err(WatchError::Config(
                "api.request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        let base = self.api.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(WatchError::Config(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }
        self.display.zone()?;
        Ok(())
    }
}

/// Job API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL the paths are joined onto.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the stats resource.
    #[serde(default = "default_stats_path")]
    pub stats_path: String,

    /// Path of the job list resource.
    #[serde(default = "default_jobs_path")]
    pub jobs_path: String,

    /// Number of recent jobs requested per cycle.
    #[serde(default = "default_jobs_limit")]
    pub jobs_limit: u32,

    /// Per-request timeout. Requests wait indefinitely when unset.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

impl ApiConfig {
    /// Path and query used to list recent jobs, e.g. `/jobs?limit=50`.
    pub fn jobs_query(&self) -> String {
        format!("{}?limit={}", self.jobs_path, self.jobs_limit)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            stats_path: default_stats_path(),
            jobs_path: default_jobs_path(),
            jobs_limit: default_jobs_limit(),
            request_timeout_ms: None,
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_stats_path() -> String {
    "/stats".to_string()
}

fn default_jobs_path() -> String {
    "/jobs".to_string()
}

fn default_jobs_limit() -> u32 {
    50
}

/// Polling schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Period between refresh cycles in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Skip a tick while the previous cycle is still in flight.
    #[serde(default)]
    pub single_flight: bool,
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            single_flight: false,
        }
    }
}

fn default_interval_ms() -> u64 {
    3000
}

/// Display options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// `local`, `utc` or an IANA zone name.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl DisplayConfig {
    pub fn zone(&self) -> Result<DisplayZone> {
        DisplayZone::parse(&self.timezone)
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

fn default_timezone() -> String {
    "local".to_string()
}

/// Substitute environment variables in the format ${VAR_NAME}.
fn substitute_env_vars(content: &str) -> String {
    let mut result = content.to_string();
    let re = match regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") {
        Ok(re) => re,
        Err(_) => return result,
    };

    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(&cap[0], &value);
        }
    }

    result
}
