//! Harvest coordinator - main orchestration logic
//!
//! Runs the whole harvest sequentially: fetch the listing page, pull the ids
//! out of it, then fetch, extract and store each text in turn. Only a failed
//! listing fetch stops the run; every per-text failure is logged and skipped.

use crate::config::Config;
use crate::crawler::extractor::{extract_fields, extract_ids};
use crate::crawler::fetcher::{build_http_client, Fetcher, HttpGet};
use crate::crawler::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::storage::{CreateMode, SqliteStorage, TextRecord, TextSink};
use crate::HarvestError;
use reqwest::Client;
use std::path::Path;

/// Outcome counts of a harvest run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    /// Ids found on the listing page, duplicates included
    pub discovered: usize,
    /// Texts inserted into storage
    pub stored: usize,
    /// Texts that failed to fetch, extract or insert
    pub failed: usize,
}

/// Drives a harvest from listing page to storage
pub struct Coordinator<K, C = Client, S = TokioSleeper> {
    sink: K,
    fetcher: Fetcher<C, S>,
}

impl<K, C, S> Coordinator<K, C, S>
where
    K: TextSink,
    C: HttpGet,
    S: Sleeper,
{
    /// Creates a coordinator writing into `sink`
    ///
    /// The sink is expected to have its schema in place already.
    pub fn new(sink: K, fetcher: Fetcher<C, S>) -> Self {
        Self { sink, fetcher }
    }

    /// Runs the harvest
    ///
    /// # Returns
    ///
    /// * `Ok(HarvestSummary)` - The listing was fetched; per-text failures are only counted
    /// * `Err(HarvestError)` - The listing page could not be fetched
    pub async fn run(&mut self) -> Result<HarvestSummary, HarvestError> {
        let listing = self
            .fetcher
            .fetch_listing()
            .await
            .inspect_err(|e| tracing::error!("Failed to fetch texts listing: {}", e))?;

        let ids = extract_ids(&listing);
        tracing::info!("Found {} texts on the listing page", ids.len());

        let mut summary = HarvestSummary {
            discovered: ids.len(),
            ..HarvestSummary::default()
        };

        for id in ids {
            match self.harvest_text(id).await {
                Ok(()) => {
                    summary.stored += 1;
                    tracing::info!("text {}: done", id);
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!("text {}: error: {}", id, e);
                }
            }
        }

        Ok(summary)
    }

    /// Fetches, extracts and stores a single text
    pub async fn harvest_text(&mut self, id: i64) -> Result<(), HarvestError> {
        let html = self.fetcher.fetch_detail(id).await?;
        let extracted = extract_fields(&html)?;
        self.sink.insert(&TextRecord::from_extracted(id, extracted))?;
        Ok(())
    }

    /// Consumes the coordinator and hands back its sink
    pub fn into_sink(self) -> K {
        self.sink
    }
}

/// Runs a complete harvest for `config`
///
/// Opens the database at `config.output.database_path` according to `mode`,
/// creates the schema, builds the HTTP client and runs the coordinator. Any
/// failure up to and including the listing fetch is returned as an error.
pub async fn run_harvest(
    config: &Config,
    mode: CreateMode,
) -> Result<HarvestSummary, HarvestError> {
    let db_path = Path::new(&config.output.database_path);

    let mut storage = SqliteStorage::open(db_path, mode)?;
    storage.create_schema()?;
    tracing::info!("Writing texts to {}", db_path.display());

    let client = build_http_client(&config.user_agent)?;
    let fetcher = Fetcher::new(
        client,
        TokioSleeper,
        RetryPolicy::from(&config.retry),
        &config.source,
    )?;

    let mut coordinator = Coordinator::new(storage, fetcher);
    let summary = coordinator.run().await?;

    tracing::info!(
        "Harvest finished: {} discovered, {} stored, {} failed",
        summary.discovered,
        summary.stored,
        summary.failed
    );

    Ok(summary)
}
