use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while constructing a store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("table size must be positive, got {0}")]
    InvalidTableSize(u32),
}

/// Errors raised while loading delimited text.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source,
        }
    }
}
