use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] vitae_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Failed to read {path}: {message}")]
    InvalidFile { path: String, message: String },
    #[error("{change}, but the sync state could not be saved: {source}")]
    StateNotSaved {
        change: String,
        source: Box<CliError>,
    },
    #[error("--smart only applies to the merge and manual strategies, not {0}")]
    SmartMergeStrategy(String),
}
