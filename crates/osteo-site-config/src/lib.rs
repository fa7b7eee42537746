use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Backoffice settings read from `~/.config/osteo-site/config.toml`.
///
/// ```toml
/// content_path = "~/osteo/content"
/// placeholder_text = "<p>Votre texte ici</p>"
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding the JSON collections (pages.json, posts.json, ...)
    pub content_path: PathBuf,
    #[serde(default)]
    placeholder_text: Option<String>,
}

impl Config {
    /// Read the config at `config_path`; a missing file is `Ok(None)`.
    ///
    /// `content_path` has `~` and `$VARS` expanded.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;
        let config = Self::parse(&content).map_err(|source| ConfigError::ConfigParseError {
            config_path: config_path.to_path_buf(),
            source,
        })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::load_from_path(Self::config_path())
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let mut config: Config = toml::from_str(content)?;
        if let Some(expanded) = Self::expand_path(&config.content_path) {
            config.content_path = expanded;
        }
        Ok(config)
    }

    /// Value for new text blocks, if one is set and not blank
    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/osteo-site");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        shellexpand::full(&path.to_string_lossy())
            .ok()
            .map(|expanded| PathBuf::from(expanded.as_ref()))
    }
}
