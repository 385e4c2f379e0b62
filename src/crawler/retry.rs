//! Linear backoff for rate-limited requests
//!
//! A request is retried only when the server answers 429. Each retry waits a
//! little longer than the previous one, up to a ceiling, and there is no
//! limit on the number of attempts: a server that keeps answering 429 keeps
//! the loop going.
//!
//! | Outcome          | Action                               |
//! |------------------|--------------------------------------|
//! | HTTP 200         | Return the body                      |
//! | HTTP 429         | Sleep, grow the backoff, try again   |
//! | Other status     | Fail with `UnexpectedStatus`         |
//! | Transport error  | Fail immediately                     |

use crate::config::RetryConfig;
use crate::crawler::fetcher::{FetchError, HttpGet};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

/// Backoff constants for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Added to the delay after every 429
    pub backoff_increment: Duration,
    /// Ceiling for the delay
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            initial_backoff: config.initial_backoff(),
            backoff_increment: config.backoff_increment(),
            max_backoff: config.max_backoff(),
        }
    }
}

/// Delay sequence for a single request: initial, initial + increment, ... capped
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    increment: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            current: policy.initial_backoff.min(policy.max_backoff),
            increment: policy.backoff_increment,
            max: policy.max_backoff,
        }
    }

    /// Returns the delay to wait now and advances to the next one
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_add(self.increment).min(self.max);
        delay
    }
}

/// Suspends the caller between retries
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// GETs `url`, retrying with linear backoff while the server answers 429
///
/// Backoff state is local to this call, so every request starts again from
/// the policy's initial delay.
///
/// # Returns
///
/// * `Ok(String)` - Body of the first 200 response
/// * `Err(FetchError)` - Transport failure or a status other than 200/429
pub async fn get_with_backoff<C, S>(
    client: &C,
    sleeper: &S,
    policy: &RetryPolicy,
    url: &Url,
) -> Result<String, FetchError>
where
    C: HttpGet + ?Sized,
    S: Sleeper + ?Sized,
{
    let mut backoff = Backoff::new(policy);

    loop {
        let response = client.get(url).await?;

        match response.status {
            StatusCode::OK => return Ok(response.body),
            StatusCode::TOO_MANY_REQUESTS => {
                let delay = backoff.next_delay();
                tracing::debug!("Rate limited on {}, retrying in {:?}", url, delay);
                sleeper.sleep(delay).await;
            }
            status => {
                return Err(FetchError::UnexpectedStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                })
            }
        }
    }
}
