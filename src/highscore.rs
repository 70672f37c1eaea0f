//! Persist the best score to disk (XDG config or ~/.config/serial-tetris).

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ScoreError;

const APP_DIR: &str = "serial-tetris";
const FILENAME: &str = "best_score";

/// Default location of the best-score file.
pub fn default_path() -> PathBuf {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join(APP_DIR).join(FILENAME)
}

/// Reads the stored best score. Missing or unparsable files read as 0.
pub fn load_best_score(path: &Path) -> u32 {
    match fs::read_to_string(path) {
        Ok(content) => content.trim().parse().unwrap_or_else(|_| {
            debug!(path = %path.display(), "best score file unparsable, using 0");
            0
        }),
        Err(_) => 0,
    }
}

/// Writes the best score, creating the parent directory if needed.
pub fn save_best_score(path: &Path, score: u32) -> Result<(), ScoreError> {
    let write_err = |source| ScoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
    }
    fs::write(path, score.to_string()).map_err(write_err)
}
