use std::path::PathBuf;

use thiserror::Error;

/// Failures of the on-disk store. Only `Configuration` escalates past the
/// store; the others are reported per file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("configuration error in {path}: {reason}")]
    Configuration { path: PathBuf, reason: String },

    #[error("invalid metadata in {path}: {reason}")]
    InvalidMetadata { path: PathBuf, reason: String },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub fn configuration(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        StoreError::Configuration {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        StoreError::InvalidMetadata {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Failures while walking the components tree.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("components root {path} is not readable")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("skipping unreadable component {path}: {reason}")]
    UnitUnreadable { path: PathBuf, reason: String },
}
