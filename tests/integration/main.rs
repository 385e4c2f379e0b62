//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the listing and detail pages and
//! check what ends up in the SQLite file.

use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use text_harvester::config::{Config, SourceConfig};
use text_harvester::crawler::{Coordinator, Fetcher, RetryPolicy, TokioSleeper};
use text_harvester::storage::{CreateMode, SqliteStorage, TextSink};
use text_harvester::{run_harvest, HarvestError, HarvestSummary};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DETAIL_42: &str = "<html><body>\n\
<div class=\"fullTextStr\">The quick brown fox jumps over the lazy dog.</div>\n\
<div>\n\
<a href=\"/pit/text_info?id=42\">Fox Stories</a>\n\
<img src=\"/book.png\"/>(book)\n\
</div>\n\
<div>by Jane &amp; Doe\n\
</div>\n\
</body></html>\n";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, db_path: &Path) -> Config {
    let mut config = Config::default();
    config.source = SourceConfig {
        listing_url: format!("{}/texts", base_url),
        detail_url: format!("{}/pit/text_info", base_url),
    };
    config.output.database_path = db_path.to_string_lossy().into_owned();
    config
}

fn detail_page(text: &str, author: &str) -> String {
    format!(
        "<div class=\"fullTextStr\">{}</div>\n<a href=\"/s\">Source</a>\n<img/>(quote)\nby {}\n",
        text, author
    )
}

async fn mount_listing(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/texts"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, id: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/pit/text_info"))
        .and(query_param("id", id))
        .respond_with(template)
        .mount(server)
        .await;
}

fn stored_rows(db_path: &Path) -> Vec<(i64, String, String, String, String)> {
    let conn = Connection::open(db_path).expect("Failed to open DB");
    let mut stmt = conn
        .prepare("SELECT id, text, type, author, source FROM texts ORDER BY id")
        .unwrap();
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
            ))
        })
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    rows
}

#[tokio::test]
async fn test_harvest_single_text() {
    let mock_server = MockServer::start().await;
    mount_listing(
        &mock_server,
        r#"<html><body><a href="/text?id=42">The quick brown fox</a></body></html>"#,
    )
    .await;
    mount_detail(
        &mock_server,
        "42",
        ResponseTemplate::new(200).set_body_string(DETAIL_42),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("texts.db");
    let config = create_test_config(&mock_server.uri(), &db_path);

    let summary = run_harvest(&config, CreateMode::CreateNew)
        .await
        .expect("Harvest failed");

    assert_eq!(
        summary,
        HarvestSummary {
            discovered: 1,
            stored: 1,
            failed: 0,
        }
    );

    let rows = stored_rows(&db_path);
    assert_eq!(
        rows,
        vec![(
            42,
            "The quick brown fox jumps over the lazy dog.".to_string(),
            "book".to_string(),
            "Jane & Doe".to_string(),
            "Fox Stories".to_string(),
        )]
    );
}

#[tokio::test]
async fn test_per_text_failures_do_not_stop_the_run() {
    let mock_server = MockServer::start().await;
    mount_listing(
        &mock_server,
        r#"
        <a href="/text?id=1">one</a>
        <a href="/text?id=2">two</a>
        <a href="/text?id=3">three</a>
        <a href="/text?id=1">one again</a>
        <a href="/text?id=4">four</a>
        "#,
    )
    .await;
    mount_detail(
        &mock_server,
        "1",
        ResponseTemplate::new(200).set_body_string(detail_page("First.", "A")),
    )
    .await;
    mount_detail(&mock_server, "2", ResponseTemplate::new(404)).await;
    mount_detail(
        &mock_server,
        "3",
        ResponseTemplate::new(200).set_body_string("<html>no text here</html>"),
    )
    .await;
    mount_detail(
        &mock_server,
        "4",
        ResponseTemplate::new(200).set_body_string(detail_page("Fourth &lt;4&gt;.", "D")),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("texts.db");
    let config = create_test_config(&mock_server.uri(), &db_path);

    let summary = run_harvest(&config, CreateMode::CreateNew).await.unwrap();

    assert_eq!(
        summary,
        HarvestSummary {
            discovered: 5,
            stored: 2,
            failed: 3,
        }
    );

    let rows = stored_rows(&db_path);
    let ids: Vec<i64> = rows.iter().map(|r| r.0).collect();
    assert_eq!(ids, vec![1, 4]);
    assert_eq!(rows[1].1, "Fourth <4>.");
    assert_eq!(rows[1].2, "quote");
}

#[tokio::test]
async fn test_listing_failure_is_fatal() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/texts"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("texts.db");
    let config = create_test_config(&mock_server.uri(), &db_path);

    let result = run_harvest(&config, CreateMode::CreateNew).await;

    assert!(matches!(result, Err(HarvestError::Fetch(_))));
    assert!(stored_rows(&db_path).is_empty());
}

#[tokio::test]
async fn test_existing_database_is_left_alone() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, r#"<a href="/text?id=42">x</a>"#).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("texts.db");
    std::fs::write(&db_path, b"previous harvest").unwrap();
    let config = create_test_config(&mock_server.uri(), &db_path);

    let result = run_harvest(&config, CreateMode::CreateNew).await;

    assert!(matches!(result, Err(HarvestError::Storage(_))));
    assert_eq!(std::fs::read(&db_path).unwrap(), b"previous harvest");
    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_rate_limited_detail_is_retried() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, r#"<a href="/text?id=42">x</a>"#).await;

    // First two detail requests are rate limited
    Mock::given(method("GET"))
        .and(path("/pit/text_info"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_detail(
        &mock_server,
        "42",
        ResponseTemplate::new(200).set_body_string(DETAIL_42),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("texts.db");
    let mut storage = SqliteStorage::open(&db_path, CreateMode::CreateNew).unwrap();
    storage.create_schema().unwrap();

    let source = SourceConfig {
        listing_url: format!("{}/texts", mock_server.uri()),
        detail_url: format!("{}/pit/text_info", mock_server.uri()),
    };
    let policy = RetryPolicy {
        initial_backoff: Duration::from_millis(10),
        backoff_increment: Duration::from_millis(10),
        max_backoff: Duration::from_millis(30),
    };
    let client = reqwest::Client::new();
    let fetcher = Fetcher::new(client, TokioSleeper, policy, &source).unwrap();

    let mut coordinator = Coordinator::new(storage, fetcher);
    let summary = coordinator.run().await.unwrap();
    drop(coordinator);

    assert_eq!(summary.stored, 1);
    let rows = stored_rows(&db_path);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].3, "Jane & Doe");
}
