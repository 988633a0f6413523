//! Page fetching seam and its reqwest implementation.

use async_trait::async_trait;

use crate::error::FetchError;
use crate::retry::retry_with_backoff;

/// A fetched HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub html: String,
    pub status: u16,
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on timeout, a non-2xx status, or a network
    /// failure once retries are exhausted.
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Fetches pages over HTTP, retrying transient failures.
///
/// Timeout and user agent come from the supplied client.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    http: reqwest::Client,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl HttpPageFetcher {
    #[must_use]
    pub fn new(http: reqwest::Client, max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            http,
            max_retries,
            backoff_base_ms,
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .http
            .get(url)
            .header("Accept", "text/html,application/xhtml+xml")
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        Ok(FetchedPage {
            html,
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.fetch_once(url)
        })
        .await
    }
}
