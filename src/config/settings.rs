// Configuration structs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Client configuration. Everything has a workable default; the config
/// file only needs to exist when the defaults don't fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the cluster API, including the `/api` prefix.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Reconciliation cadence in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Where downloads land. Defaults to the platform download
    /// directory, falling back to the current directory.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            poll_interval_secs: default_poll_interval_secs(),
            download_dir: default_download_dir(),
        }
    }
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        // A zero interval would busy-loop the reconciler.
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

fn default_api_base_url() -> String {
    "http://localhost:8081/api".to_string()
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_download_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = Config::default();
        assert_eq!(c.api_base_url, "http://localhost:8081/api");
        assert_eq!(c.poll_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_empty_toml_gets_defaults() {
        let c: Config = toml::from_str("").unwrap();
        assert_eq!(c.poll_interval_secs, 5);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let c: Config = toml::from_str(
            r#"
            api_base_url = "https://cluster.example.com/api"
            poll_interval_secs = 2
            "#,
        )
        .unwrap();
        assert_eq!(c.api_base_url, "https://cluster.example.com/api");
        assert_eq!(c.poll_interval(), Duration::from_secs(2));
    }

    #[test]
    fn test_zero_interval_clamped() {
        let c: Config = toml::from_str("poll_interval_secs = 0").unwrap();
        assert_eq!(c.poll_interval(), Duration::from_secs(1));
    }
}
