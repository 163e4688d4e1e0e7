use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors from the file-facing edges of the crate. Rendering itself cannot fail.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
