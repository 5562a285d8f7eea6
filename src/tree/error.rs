//! Error types for tree construction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from scanning the filesystem.
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TreeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TreeError::Io {
            path: path.into(),
            source,
        }
    }
}
