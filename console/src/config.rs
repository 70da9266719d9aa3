//! Client configuration: defaults, optional TOML file, environment overrides

use anyhow::Context;
use jifeng_engine::FlowOptions;
use jifeng_networking::ClientOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_FILE: &str = "jifeng.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// Where the credential database lives; platform default when unset
    pub data_dir: Option<PathBuf>,
    /// Print verification codes echoed by development backends
    pub expose_dev_code: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".into(),
            request_timeout_secs: 15,
            data_dir: None,
            expose_dev_code: false,
        }
    }
}

impl ClientConfig {
    /// Load from `path` (or `jifeng.toml` in the working directory if it
    /// exists), then apply `JIFENG_*` environment variables
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_FILE).exists() => Self::from_file(Path::new(DEFAULT_FILE))?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("JIFENG_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = var("JIFENG_REQUEST_TIMEOUT_SECS") {
            match v.parse() {
                Ok(secs) => self.request_timeout_secs = secs,
                Err(_) => tracing::warn!("Ignoring invalid JIFENG_REQUEST_TIMEOUT_SECS: {}", v),
            }
        }
        if let Some(v) = var("JIFENG_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = var("JIFENG_EXPOSE_DEV_CODE") {
            self.expose_dev_code = matches!(v.as_str(), "1" | "true" | "yes");
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs_next::data_local_dir()
                .map(|p| p.join("Jifeng"))
                .unwrap_or_else(|| PathBuf::from("."))
        })
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn flow_options(&self) -> FlowOptions {
        FlowOptions {
            expose_echoed_code: self.expose_dev_code,
            ..FlowOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: ClientConfig = toml::from_str(r#"base_url = "https://points.example.com""#).unwrap();
        assert_eq!(config.base_url, "https://points.example.com");
        assert_eq!(config.request_timeout_secs, 15);
        assert!(!config.expose_dev_code);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("JIFENG_BASE_URL", "http://10.0.0.2:8080"),
            ("JIFENG_REQUEST_TIMEOUT_SECS", "30"),
            ("JIFENG_DATA_DIR", "/tmp/jifeng"),
            ("JIFENG_EXPOSE_DEV_CODE", "true"),
        ]
        .into_iter()
        .collect();

        let mut config = ClientConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.base_url, "http://10.0.0.2:8080");
        assert_eq!(config.client_options().timeout, Duration::from_secs(30));
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/jifeng"));
        assert!(config.flow_options().expose_echoed_code);
    }

    #[test]
    fn test_invalid_timeout_is_ignored() {
        let mut config = ClientConfig::default();
        config.apply_env(|key| (key == "JIFENG_REQUEST_TIMEOUT_SECS").then(|| "soon".to_string()));
        assert_eq!(config.request_timeout_secs, 15);
    }
}
