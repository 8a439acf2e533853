// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use std::{future::Future, time::Duration};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

mod retry;

pub use retry::{is_transient, RetryPolicy, MAX_BACKOFF, TRANSIENT_STATUSES};

#[derive(Debug, Error)]
pub enum FetchError {
    /// The request outlived the client timeout. The page may be retried.
    #[error("page {page}: request timed out")]
    Timeout { page: u32 },
    #[error("page {page}: HTTP {status}")]
    Http { page: u32, status: StatusCode },
    #[error("page {page}: network error: {message}")]
    Network { page: u32, message: String },
}

impl FetchError {
    pub fn page(&self) -> u32 {
        match self {
            FetchError::Timeout { page }
            | FetchError::Http { page, .. }
            | FetchError::Network { page, .. } => *page,
        }
    }

    fn from_reqwest(page: u32, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout { page }
        } else {
            FetchError::Network {
                page,
                message: err.to_string(),
            }
        }
    }
}

/// Anything that can hand out listing pages by number.
pub trait PageSource {
    fn fetch_page(&self, page: u32) -> impl Future<Output = Result<String, FetchError>>;
}

/// Fetches `{base_url}?page={n}` over HTTP, retrying transient server errors.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl PageFetcher {
    pub fn new(base_url: &str, timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bioscraper/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;
        Self::with_client(client, base_url, retry)
    }

    pub fn with_client(client: Client, base_url: &str, retry: RetryPolicy) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("parsing base URL {}", base_url))?;
        Ok(Self {
            client,
            base_url,
            retry,
        })
    }

    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("page", &page.to_string());
        url
    }
}

impl PageSource for PageFetcher {
    async fn fetch_page(&self, page: u32) -> Result<String, FetchError> {
        let url = self.page_url(page);
        let mut attempt = 0;

        loop {
            debug!(%url, attempt, "GET");
            let resp = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| FetchError::from_reqwest(page, e))?;

            let status = resp.status();
            if status.is_success() {
                return resp
                    .text()
                    .await
                    .map_err(|e| FetchError::from_reqwest(page, e));
            }

            if is_transient(status) && attempt < self.retry.max_retries {
                attempt += 1;
                let delay = self.retry.backoff(attempt);
                warn!(page, %status, attempt, delay_ms = delay.as_millis() as u64, "transient status, retrying");
                sleep(delay).await;
                continue;
            }

            return Err(FetchError::Http { page, status });
        }
    }
}
