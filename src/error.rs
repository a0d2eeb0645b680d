use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to load assets from {dir}: {reason}", dir = path.display())]
    AssetLoad {
        path: PathBuf,
        reason: AssetLoadReason,
    },

    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Face detector error: {0}")]
    Detector(String),

    #[error("Capture error: {0}")]
    Capture(String),
}

/// Why an asset directory could not be turned into a store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetLoadReason {
    #[error("directory not found")]
    Missing,

    #[error("not a directory")]
    NotADirectory,

    #[error("directory could not be read ({0})")]
    Unreadable(String),

    #[error("no loadable images")]
    Empty,

    #[error("cannot decode {file}: {message}")]
    Decode { file: String, message: String },
}

impl Error {
    pub(crate) fn asset_load<P: AsRef<Path>>(path: P, reason: AssetLoadReason) -> Self {
        Self::AssetLoad {
            path: path.as_ref().to_path_buf(),
            reason,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
