use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to the user when loading a dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    /// "Load" was pressed with nothing picked in the catalog.
    #[error("Please select a file")]
    NoSelection,

    /// Catalog identifier that would escape the datasets directory.
    #[error("Invalid dataset identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported file format: .{extension}")]
    UnsupportedFormat { extension: String },

    #[error("Failed to parse dataset: {0:#}")]
    Parse(#[from] anyhow::Error),

    /// The background worker went away without reporting back.
    #[error("Loader worker stopped unexpectedly")]
    WorkerGone,
}

impl LoadError {
    pub fn io(path: PathBuf, source: std::io::Error) -> Self {
        Self::Io { path, source }
    }
}
