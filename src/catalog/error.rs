//! Error types for catalog operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from scanning or mutating the report library.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// File system error.
    #[error("IO error at {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// No catalog entry has this source path.
    #[error("no catalog entry for {path}")]
    EntryNotFound {
        /// Requested source path.
        path: PathBuf,
    },

    /// The entry is being converted and cannot be renamed or deleted.
    #[error("{path} is being converted; try again when the conversion finishes")]
    ConversionActive {
        /// Source path of the active job.
        path: PathBuf,
    },

    /// Only PDF and Word documents are accepted.
    #[error("unsupported report type: {path} (expected .pdf, .doc or .docx)")]
    Unsupported {
        /// Offending file.
        path: PathBuf,
    },

    /// Renaming would overwrite an existing file.
    #[error("target already exists: {path}")]
    TargetExists {
        /// Conflicting path.
        path: PathBuf,
    },
}

impl CatalogError {
    /// Creates an IO error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an entry-not-found error.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::EntryNotFound { path: path.into() }
    }
}
