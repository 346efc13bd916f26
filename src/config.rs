use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

pub const CONFIG_FILE: &str = "testrider.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Where the results server lives.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Base URL, without the `/api/...` suffix.
    /// Example: "http://localhost:8080"
    #[serde(default = "default_url")]
    pub url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { url: default_url() }
    }
}

/// Timing knobs for fetching and the notification stream.
#[derive(Debug, Deserialize)]
pub struct SyncConfig {
    /// Fallback refresh when notifications go missing. `0` disables it.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Delay before reopening a dropped event stream, until the server
    /// sends its own `retry:` hint.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            reconnect_delay_ms: default_reconnect_delay(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl SyncConfig {
    pub fn poll_interval(&self) -> Option<Duration> {
        (self.poll_interval_secs > 0).then(|| Duration::from_secs(self.poll_interval_secs))
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }
}

fn default_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_poll_interval() -> u64 {
    30
}

fn default_reconnect_delay() -> u64 {
    3000
}

fn default_connect_timeout() -> u64 {
    10
}

impl Config {
    /// Load `testrider.toml` from `dir`, falling back to defaults if absent or invalid.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(CONFIG_FILE);
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        toml::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "ignoring invalid config");
            Self::default()
        })
    }
}
