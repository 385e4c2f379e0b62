//! Crawler module for fetching and processing pages
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching, with linear backoff on 429 responses
//! - Pattern extraction of ids and text fields
//! - Overall harvest coordination

mod coordinator;
mod extractor;
mod fetcher;
mod retry;

pub use coordinator::{run_harvest, Coordinator, HarvestSummary};
pub use extractor::{extract_fields, extract_ids, ExtractError, ExtractedText};
pub use fetcher::{build_http_client, FetchError, Fetcher, HttpGet, HttpResponse};
pub use retry::{get_with_backoff, Backoff, RetryPolicy, Sleeper, TokioSleeper};
