//! HTTP client wrapper for fetching pages and report files.
//!
//! This module provides the `HttpClient` struct which fetches HTML pages as
//! text and streams report files to disk, with timeout configuration and
//! structured errors.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};
use url::Url;

use super::error::FetchError;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (2 minutes per file).
pub const READ_TIMEOUT_SECS: u64 = 120;

/// Browser User-Agent; the report site rejects obvious bot agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// HTTP client for page fetches and streaming file downloads.
///
/// Create once and clone freely; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Fetches `url` and returns the response body as text.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on invalid URLs, transport failures, timeouts,
    /// and non-2xx responses.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.get(url).await?;
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::network(url, e))?;
        debug!(bytes = body.len(), "fetched page");
        Ok(body)
    }

    /// Streams the body of `url` into `destination`, creating or truncating it.
    ///
    /// A partially written file is removed when the transfer fails.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failures, non-2xx responses, and
    /// write errors.
    #[instrument(skip(self), fields(url = %url, path = %destination.display()))]
    pub async fn download_to_file(&self, url: &str, destination: &Path) -> Result<u64, FetchError> {
        let response = self.get(url).await?;

        let mut file = File::create(destination)
            .await
            .map_err(|e| FetchError::io(destination, e))?;

        let stream_result = stream_to_file(&mut file, response, url, destination).await;
        if stream_result.is_err() {
            debug!("cleaning up partial file after error");
            drop(file);
            let _ = tokio::fs::remove_file(destination).await;
        }
        let bytes = stream_result?;

        debug!(bytes, "download complete");
        Ok(bytes)
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url, status.as_u16()));
        }
        Ok(response)
    }
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, FetchError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| FetchError::network(url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| FetchError::io(file_path, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| FetchError::io(file_path, e))?;

    Ok(bytes_written)
}
