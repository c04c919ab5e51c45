//! Configuration loaded from an optional TOML file, with sensible defaults
//! for a locally running sentiment API.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::feed::DEFAULT_CAPACITY;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_host: String,
    pub api_port: u16,
    /// Pull-channel cadence. The dashboard view polls slowly; a feed-only
    /// view can turn this down to a few seconds.
    pub poll_interval_secs: u64,
    pub fetch_timeout_secs: u64,
    pub feed_capacity: usize,
    /// Window requested from the analytics endpoint.
    pub analytics_hours: u32,
    pub platform_filter: Option<String>,
    /// Author used when composing posts from the dashboard.
    pub author: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_host: "localhost".to_string(),
            api_port: 8000,
            poll_interval_secs: 30,
            fetch_timeout_secs: 10,
            feed_capacity: DEFAULT_CAPACITY,
            analytics_hours: 24,
            platform_filter: None,
            author: "anonymous".to_string(),
        }
    }
}

impl Config {
    /// Load from an explicit path, or from the default location. A missing
    /// file yields the defaults; a present but malformed file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let config: Config = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config at {}", path.display()))?;
        Ok(config)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sentitui").join("config.toml"))
    }

    pub fn http_base(&self) -> String {
        format!("http://{}:{}", self.api_host, self.api_port)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}:{}/ws/sentiment", self.api_host, self.api_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.http_base(), "http://localhost:8000");
        assert_eq!(config.ws_url(), "ws://localhost:8000/ws/sentiment");
        assert_eq!(config.feed_capacity, 50);
        assert_eq!(config.poll_interval_secs, 30);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults_for_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "api_host = \"sentiment.internal\"").unwrap();
        writeln!(file, "poll_interval_secs = 5").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.api_host, "sentiment.internal");
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.api_port, 8000);
        assert_eq!(config.feed_capacity, 50);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_port = \"not a number\"").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
