use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration, compiled into the binary.
const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub render: RenderConfig,
    pub images: ImagesConfig,
    pub post: PostConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    pub wrap: bool,
    pub class_prefix: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            wrap: true,
            class_prefix: "blog".to_string(),
        }
    }
}

impl RenderConfig {
    /// CSS class for an element, e.g. `heading` -> `blog-heading`.
    pub fn class(&self, name: &str) -> String {
        if self.class_prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}-{}", self.class_prefix, name)
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImagesConfig {
    pub broken: Vec<String>,
    pub probe_local: bool,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            broken: Vec::new(),
            probe_local: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PostConfig {
    pub words_per_minute: usize,
    pub excerpt_length: usize,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            words_per_minute: 200,
            excerpt_length: 160,
        }
    }
}

impl Config {
    /// Load the compiled-in default config.
    pub fn compiled_default() -> Self {
        // Validated by build.rs, so a parse failure here is unreachable in practice
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Load config from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load config from a TOML file, or return defaults if it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::compiled_default());
        }
        Self::load(path)
    }

    /// Config for a run: `explicit` must load if given, otherwise `fallback`
    /// is used when it exists.
    pub fn resolve(explicit: Option<&Path>, fallback: &Path) -> crate::Result<Self> {
        let config = match explicit {
            Some(path) => Self::load(path)?,
            None => Self::load_or_default(fallback)?,
        };
        Ok(config)
    }
}
