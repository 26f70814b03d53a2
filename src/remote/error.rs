//! Error types for remote fetches and subject discovery.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching a page or file.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Non-success HTTP response.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The provided URL is malformed or not absolute.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// File system error while writing a fetched body to disk.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Creates a network error from a reqwest error, promoting timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::Timeout { url: url.into() };
        }
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors returned by subject discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The index page could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The index page was fetched but no subject links survived filtering.
    ///
    /// This is an informational outcome rather than a transport failure.
    #[error("no subjects found on the index page {url}")]
    NoSubjectsFound {
        /// The index page that was scanned.
        url: String,
    },
}

impl DiscoveryError {
    /// Returns true for outcomes that should be shown as information, not errors.
    #[must_use]
    pub fn is_informational(&self) -> bool {
        matches!(self, Self::NoSubjectsFound { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_http_status_display() {
        let error = FetchError::http_status("https://example.com/report.pdf", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(
            msg.contains("https://example.com/report.pdf"),
            "Expected URL in: {msg}"
        );
    }

    #[test]
    fn test_fetch_error_io_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = FetchError::io(PathBuf::from("/tmp/report.pdf.part"), io_error);
        assert!(error.to_string().contains("/tmp/report.pdf.part"));
    }

    #[test]
    fn test_fetch_error_invalid_url_display() {
        let msg = FetchError::invalid_url("not-a-url").to_string();
        assert!(msg.contains("invalid URL"), "Expected 'invalid URL' in: {msg}");
        assert!(msg.contains("not-a-url"));
    }

    #[test]
    fn test_discovery_no_subjects_is_informational() {
        let error = DiscoveryError::NoSubjectsFound {
            url: "https://example.com/index".to_string(),
        };
        assert!(error.is_informational());
        assert!(error.to_string().contains("no subjects found"));

        let error = DiscoveryError::from(FetchError::http_status("https://example.com", 500));
        assert!(!error.is_informational());
        assert!(error.to_string().contains("HTTP 500"));
    }
}
