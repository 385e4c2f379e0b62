//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester:
//! - Building the HTTP client with an identifying user agent
//! - Fetching the listing page (single attempt)
//! - Fetching detail pages through the 429 backoff loop

use crate::config::{SourceConfig, UserAgentConfig};
use crate::crawler::retry::{get_with_backoff, RetryPolicy, Sleeper, TokioSleeper};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that end a fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http request failed for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status code {status} for {url}")]
    UnexpectedStatus { url: String, status: u16 },
}

/// Status and body of a completed GET
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

/// A single GET request, with no retry of its own
#[async_trait]
pub trait HttpGet: Send + Sync {
    async fn get(&self, url: &Url) -> Result<HttpResponse, FetchError>;
}

#[async_trait]
impl HttpGet for Client {
    async fn get(&self, url: &Url) -> Result<HttpResponse, FetchError> {
        let transport = |source: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = Client::get(self, url.clone())
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;

        Ok(HttpResponse { status, body })
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Example
///
/// ```no_run
/// use text_harvester::config::UserAgentConfig;
/// use text_harvester::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Format: CrawlerName/Version (+ContactURL)
fn user_agent_string(config: &UserAgentConfig) -> String {
    match &config.contact_url {
        Some(contact_url) => format!(
            "{}/{} (+{})",
            config.crawler_name, config.crawler_version, contact_url
        ),
        None => format!("{}/{}", config.crawler_name, config.crawler_version),
    }
}

/// Fetches the listing page and detail pages of the source site
pub struct Fetcher<C = Client, S = TokioSleeper> {
    client: C,
    sleeper: S,
    policy: RetryPolicy,
    listing_url: Url,
    detail_url: Url,
}

impl<C: HttpGet, S: Sleeper> Fetcher<C, S> {
    /// Creates a fetcher for the site described by `source`
    ///
    /// # Returns
    ///
    /// * `Ok(Fetcher)` - Both URLs parsed
    /// * `Err(url::ParseError)` - The listing or detail URL is malformed
    pub fn new(
        client: C,
        sleeper: S,
        policy: RetryPolicy,
        source: &SourceConfig,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            client,
            sleeper,
            policy,
            listing_url: Url::parse(&source.listing_url)?,
            detail_url: Url::parse(&source.detail_url)?,
        })
    }

    /// Fetches the listing page in a single attempt
    ///
    /// Any status other than 200, 429 included, is an error.
    pub async fn fetch_listing(&self) -> Result<String, FetchError> {
        let response = self.client.get(&self.listing_url).await?;

        if response.status != StatusCode::OK {
            return Err(FetchError::UnexpectedStatus {
                url: self.listing_url.to_string(),
                status: response.status.as_u16(),
            });
        }

        Ok(response.body)
    }

    /// Fetches the detail page for `id`, backing off while rate limited
    pub async fn fetch_detail(&self, id: i64) -> Result<String, FetchError> {
        let url = self.detail_url(id);
        get_with_backoff(&self.client, &self.sleeper, &self.policy, &url).await
    }

    /// Detail page URL for `id`
    pub fn detail_url(&self, id: i64) -> Url {
        let mut url = self.detail_url.clone();
        url.query_pairs_mut().append_pair("id", &id.to_string());
        url
    }
}
