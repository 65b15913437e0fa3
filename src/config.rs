use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::paths::config_file_path;

pub const DEFAULT_HANDOFF_URI: &str = "chatwise://chat";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub handoff: HandoffConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&raw)
            .with_context(|| format!("failed to parse TOML from {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StorageConfig {
    /// Overrides the state database location.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ExportConfig {
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

/// Per-language dataset files replacing the embedded tables.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DatasetConfig {
    #[serde(default)]
    pub en: Option<PathBuf>,
    #[serde(default)]
    pub zh: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HandoffConfig {
    #[serde(default = "default_base_uri")]
    pub base_uri: String,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            base_uri: default_base_uri(),
        }
    }
}

fn default_base_uri() -> String {
    DEFAULT_HANDOFF_URI.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = AppConfig::parse("").expect("empty config should parse");
        assert!(config.storage.path.is_none());
        assert!(config.export.directory.is_none());
        assert!(config.dataset.en.is_none());
        assert_eq!(config.handoff.base_uri, DEFAULT_HANDOFF_URI);
    }

    #[test]
    fn sections_override_defaults() {
        let raw = r#"
            [export]
            directory = "/tmp/shots"

            [dataset]
            zh = "/data/zh.json"

            [handoff]
            base_uri = "chatwise-beta://chat"
        "#;
        let config = AppConfig::parse(raw).expect("config should parse");
        assert_eq!(config.export.directory, Some(PathBuf::from("/tmp/shots")));
        assert_eq!(config.dataset.zh, Some(PathBuf::from("/data/zh.json")));
        assert!(config.dataset.en.is_none());
        assert_eq!(config.handoff.base_uri, "chatwise-beta://chat");
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let path = std::env::temp_dir().join("anime-sedai-no-such-config.toml");
        let config = AppConfig::load_from(&path).expect("missing file should yield defaults");
        assert_eq!(config.handoff.base_uri, DEFAULT_HANDOFF_URI);
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(AppConfig::parse("[export\ndirectory = 1").is_err());
    }
}
