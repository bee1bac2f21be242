/// Dashboard configuration.
///
/// Loaded from a TOML file (default `./aquamon.toml`), then overridden by
/// environment variables, which may themselves come from a `.env` file.
/// Every field has a default, so a missing file is not an error; a file
/// that exists but does not parse is.
///
/// ```toml
/// base_url = "http://127.0.0.1:5000"
/// poll_interval_secs = 60
/// log_level = "debug"
/// log_file = "aquamon.log"
/// ```

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::logging::LogLevel;

pub const DEFAULT_CONFIG_PATH: &str = "./aquamon.toml";

pub const ENV_BASE_URL: &str = "AQUAMON_BASE_URL";
pub const ENV_PUSH_URL: &str = "AQUAMON_PUSH_URL";
pub const ENV_LOG_LEVEL: &str = "AQUAMON_LOG_LEVEL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Root of the backend's HTTP API, without trailing slash.
    pub base_url: String,
    /// Push channel URL. Derived from `base_url` when absent.
    pub push_url: Option<String>,
    /// Full reload cadence.
    pub poll_interval_secs: u64,
    /// How long a notification stays visible. Unset leaves each page its
    /// own default.
    pub toast_secs: Option<u64>,
    /// Simulated report generation time.
    pub report_delay_ms: u64,
    /// How long the placeholder download link stays on the page.
    pub download_link_secs: u64,
    /// Points kept by live trend charts.
    pub live_window: usize,
    /// Points kept by historical charts.
    pub history_window: usize,
    /// Duration of numeric value animations.
    pub tween_ms: u64,
    pub log_level: String,
    pub log_file: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            push_url: None,
            poll_interval_secs: 60,
            toast_secs: None,
            report_delay_ms: 2_000,
            download_link_secs: 5,
            live_window: 10,
            history_window: 24,
            tween_ms: 800,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl DashboardConfig {
    /// Loads the file at `path` (defaults when it does not exist), then
    /// applies environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let path = path.as_ref();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            Self::from_toml(&text).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Applies overrides from a variable lookup. Taking the lookup as a
    /// closure keeps tests away from the real process environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(url) = lookup(ENV_PUSH_URL) {
            self.push_url = Some(url);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        self.base_url = self.base_url.trim_end_matches('/').to_string();
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "base_url",
                value: self.base_url.clone(),
            });
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "poll_interval_secs",
                value: "0".to_string(),
            });
        }
        if self.live_window == 0 || self.history_window == 0 {
            return Err(ConfigError::InvalidValue {
                key: "live_window/history_window",
                value: format!("{}/{}", self.live_window, self.history_window),
            });
        }
        self.log_level()?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<LogLevel, ConfigError> {
        LogLevel::parse(&self.log_level).ok_or_else(|| ConfigError::InvalidValue {
            key: "log_level",
            value: self.log_level.clone(),
        })
    }

    /// The Socket.IO websocket endpoint: `push_url` if set, otherwise
    /// `base_url` with its scheme swapped to `ws`/`wss`.
    pub fn push_endpoint(&self) -> String {
        if let Some(url) = &self.push_url {
            return url.clone();
        }
        let ws_base = self
            .base_url
            .replacen("https://", "wss://", 1)
            .replacen("http://", "ws://", 1);
        format!("{}/socket.io/?EIO=4&transport=websocket", ws_base)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn report_delay(&self) -> Duration {
        Duration::from_millis(self.report_delay_ms)
    }

    pub fn download_link_duration(&self) -> Duration {
        Duration::from_secs(self.download_link_secs)
    }
}
