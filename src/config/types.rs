use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for the harvester
///
/// Every section is optional in the TOML file; missing sections fall back to
/// the public site and the fixed backoff constants.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub retry: RetryConfig,
    pub output: OutputConfig,
}

/// Where the listing and detail pages live
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Page enumerating all texts via `/text?id=<N>` links
    #[serde(rename = "listing-url")]
    pub listing_url: String,

    /// Per-text page; the id is appended as the `id` query parameter
    #[serde(rename = "detail-url")]
    pub detail_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            listing_url: "https://typeracerdata.com/texts".to_string(),
            detail_url: "https://data.typeracer.com/pit/text_info".to_string(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

/// Backoff constants applied when the detail endpoint answers 429
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    #[serde(rename = "initial-backoff-secs")]
    pub initial_backoff_secs: u64,

    #[serde(rename = "backoff-increment-secs")]
    pub backoff_increment_secs: u64,

    #[serde(rename = "max-backoff-secs")]
    pub max_backoff_secs: u64,
}

impl RetryConfig {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_secs(self.initial_backoff_secs)
    }

    pub fn backoff_increment(&self) -> Duration {
        Duration::from_secs(self.backoff_increment_secs)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_secs)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_backoff_secs: 5,
            backoff_increment_secs: 5,
            max_backoff_secs: 30,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "texts.db".to_string(),
        }
    }
}
