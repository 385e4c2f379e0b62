//! Pattern extraction for listing and detail pages
//!
//! The site's markup is not well-formed enough to be worth a DOM walk, so
//! both pages are read with fixed regular expressions:
//! - the listing page yields every `/text?id=<N>` link
//! - the detail page yields the text, its source, its type and its author

use std::sync::LazyLock;

use html_escape::decode_html_entities;
use regex::Regex;
use thiserror::Error;

/// Link to a text on the listing page
#[allow(clippy::expect_used)]
static TEXT_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/text\?id=([0-9]+)").expect("text id regex is valid") // Static pattern, safe to panic
});

/// Detail page fields. `(?s)` turns on dot-matches-newline for the rest of the
/// pattern, so only the full text capture is confined to a single line.
///
/// Groups: 1 = full text, 2 = source, 3 = type, 4 = author.
#[allow(clippy::expect_used)]
static TEXT_INFO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"fullTextStr">(.*?)</div>(?s).*>(.*)</a>(?s).*/>\((.*)\)(?s).*by (.*?)\n"#)
        .expect("text info regex is valid") // Static pattern, safe to panic
});

const FULL_TEXT: usize = 1;
const SOURCE: usize = 2;
const TEXT_TYPE: usize = 3;
const AUTHOR: usize = 4;

/// Errors raised while pulling fields out of a detail page
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("failed to match text info")]
    NoMatch,
}

/// Fields pulled from a detail page, already entity-decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub source: String,
    pub text_type: String,
    pub author: String,
}

/// Extracts text ids from the listing page
///
/// Ids come back in order of appearance with duplicates preserved. A capture
/// that does not fit in an `i64` is skipped.
///
/// # Example
///
/// ```
/// use text_harvester::crawler::extract_ids;
///
/// let html = r#"<a href="/text?id=3">a</a> <a href="/text?id=1">b</a>"#;
/// assert_eq!(extract_ids(html), vec![3, 1]);
/// ```
pub fn extract_ids(listing_html: &str) -> Vec<i64> {
    TEXT_ID_PATTERN
        .captures_iter(listing_html)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| match m.as_str().parse::<i64>() {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::trace!("Skipping unparseable id '{}': {}", m.as_str(), e);
                None
            }
        })
        .collect()
}

/// Extracts the text fields from a detail page
///
/// # Returns
///
/// * `Ok(ExtractedText)` - All four captures, HTML entities decoded
/// * `Err(ExtractError::NoMatch)` - The page does not have the expected structure
pub fn extract_fields(detail_html: &str) -> Result<ExtractedText, ExtractError> {
    let caps = TEXT_INFO_PATTERN
        .captures(detail_html)
        .ok_or(ExtractError::NoMatch)?;

    let group = |index: usize| {
        caps.get(index)
            .map(|m| decode_html_entities(m.as_str()).into_owned())
            .unwrap_or_default()
    };

    Ok(ExtractedText {
        text: group(FULL_TEXT),
        source: group(SOURCE),
        text_type: group(TEXT_TYPE),
        author: group(AUTHOR),
    })
}
