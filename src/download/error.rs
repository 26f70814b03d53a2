//! Error types for the download module.

use std::path::PathBuf;

use thiserror::Error;

use crate::remote::FetchError;

/// Errors from a subject download batch or one of its files.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Fetching the subject page or a report failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// File system error while preparing or finalizing a download.
    #[error("IO error at {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The report URL has no usable last path segment.
    #[error("cannot derive a file name from {url}")]
    NoFileName {
        /// The offending URL.
        url: String,
    },

    /// Semaphore was closed unexpectedly.
    #[error("download worker pool closed unexpectedly")]
    PoolClosed,
}

impl DownloadError {
    /// Creates an IO error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a missing file name error.
    #[must_use]
    pub fn no_file_name(url: impl Into<String>) -> Self {
        Self::NoFileName { url: url.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display_includes_path() {
        let err = DownloadError::io(
            "/tmp/reports/Chemistry",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/reports/Chemistry"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_fetch_error_is_transparent() {
        let err: DownloadError = FetchError::http_status("https://example.com/a.pdf", 404).into();
        assert_eq!(
            err.to_string(),
            FetchError::http_status("https://example.com/a.pdf", 404).to_string()
        );
    }
}
