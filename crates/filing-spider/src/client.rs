use crate::config::SpiderConfig;
use crate::error::SpiderError;
use crate::http::*;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{trace, warn};

/// Anything that can GET a page as text. Success statuses return the body; anything else is a
/// [`SpiderError::Status`].
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String, SpiderError>;
}

#[async_trait]
impl<T: Fetch + ?Sized> Fetch for Arc<T> {
    async fn get_text(&self, url: &str) -> Result<String, SpiderError> {
        (**self).get_text(url).await
    }
}

/// HTTP client for the SEC endpoints.
///
/// Every request carries the configured `User-Agent`, is subject to a fixed timeout, and waits
/// for its turn under the shared rate limit. Clones share the same throttle.
#[derive(Clone, Debug)]
pub struct EdgarClient {
    http: HttpClient,
    next_slot: Arc<Mutex<Instant>>,
    interval: Duration,
    retry: RetryPolicy,
}

impl EdgarClient {
    pub fn new(config: &SpiderConfig) -> Result<Self, SpiderError> {
        if config.user_agent.trim().is_empty() {
            return Err(SpiderError::MissingUserAgent);
        }

        let http = reqwest::ClientBuilder::new()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            next_slot: Arc::new(Mutex::new(Instant::now())),
            interval: config.request_interval(),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                backoff: config.retry_backoff,
            },
        })
    }

    // reserve the next request slot, then sleep until it arrives
    async fn wait_turn(&self) {
        let slot = {
            let mut next = self.next_slot.lock().await;
            let slot = (*next).max(Instant::now());
            *next = slot + self.interval;
            slot
        };
        tokio::time::sleep_until(slot).await;
    }

    async fn get_once(&self, url: &str) -> Result<String, SpiderError> {
        self.wait_turn().await;

        trace!("GET {url}");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SpiderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl Fetch for EdgarClient {
    async fn get_text(&self, url: &str) -> Result<String, SpiderError> {
        self.retry.run(url, || self.get_once(url)).await
    }
}

/// Extra attempts for transient failures, with the backoff doubling each time.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub(crate) async fn run<F, Fut, T>(&self, url: &str, mut op: F) -> Result<T, SpiderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SpiderError>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    let wait = self.backoff.saturating_mul(2u32.saturating_pow(attempt));
                    attempt += 1;
                    warn!(
                        "GET {url} failed, retrying in {wait:?} ({attempt}/{}), error({err})",
                        self.max_retries
                    );
                    tokio::time::sleep(wait).await;
                }
                result => return result,
            }
        }
    }
}
