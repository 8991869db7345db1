//! Page-fetch collaborator: raw markup for a URL, or a failure value.
//!
//! Failures are ordinary values, never panics; callers degrade to an empty
//! result for the affected page instead of propagating.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use thiserror::Error;

/// Request identity presented to the listing sites.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a page could not be fetched. Callers treat every failure the same way
/// (timeouts included), so no variants are exposed.
#[derive(Debug, Error)]
#[error("fetch failed: {reason}")]
pub struct FetchError {
    reason: String,
}

impl FetchError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// HTTP fetcher with a bounded per-request timeout and a browser-like
/// User-Agent; non-2xx statuses are failures.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(url)
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.text().await?)
    }
}
