//! Error types for the engine and its collaborators.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid piece type tag: {0:?}")]
    InvalidPieceType(char),
}

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("failed to open serial device {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: serialport::Error,
    },
    #[error("no serial device configured (use --device)")]
    NotConfigured,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("could not write best score to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
