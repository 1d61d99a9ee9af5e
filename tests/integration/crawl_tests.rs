//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use async_trait::async_trait;
use harvest_qa::config::Config;
use harvest_qa::crawler::{crawl, run_crawl, Coordinator, RunRequest};
use harvest_qa::generation::{GeminiGenerator, GenerationError, QaGenerator, QaPair, RetryPolicy};
use harvest_qa::output::{load_records, FALLBACK_SENTINEL};
use harvest_qa::state::{FailureReason, PageOutcome, RunState};
use serde_json::json;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds an HTML page with navigation links and an article body
fn page(title: &str, body: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a> "#, href, href))
        .collect();
    format!(
        "<html><head><title>{title}</title></head><body>\
         <nav>{anchors}</nav>\
         <article><h1>{title}</h1><p>{body}</p></article>\
         </body></html>"
    )
}

/// Creates a fast run request against a mock server
fn test_request(seed: &str, output: &Path) -> RunRequest {
    RunRequest::new(seed, output)
        .with_request_delay(Duration::ZERO)
        .with_retry(RetryPolicy::new(3, Duration::ZERO))
}

async fn mount_page(server: &MockServer, route: &str, html: String, hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"))
        .expect(hits)
        .mount(server)
        .await;
}

/// Generator that answers every request without network access
struct EchoGenerator;

#[async_trait]
impl QaGenerator for EchoGenerator {
    async fn generate(&self, _text: &str, source_url: &str) -> Result<QaPair, GenerationError> {
        Ok(QaPair {
            question: format!("What is on {}?", source_url),
            answer: "A test page.".to_string(),
        })
    }

    fn name(&self) -> &str {
        "echo"
    }
}

#[tokio::test]
async fn test_quota_of_one_stops_before_link_discovery() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page("Home", "Welcome to the home page of this small test site.", &["/a", "/b"]),
        1,
    )
    .await;
    mount_page(&server, "/a", page("A", "Page A has plenty of words in it.", &[]), 0).await;
    mount_page(&server, "/b", page("B", "Page B has plenty of words in it.", &[]), 0).await;

    let dir = tempdir().unwrap();
    let output = dir.path().join("out.json");
    let request = test_request(&server.uri(), &output).with_page_quota(1);

    let report = run_crawl(request).await.unwrap();

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.statistics.links_enqueued, 0);
    assert_eq!(report.statistics.frontier_remaining, 0);
    assert!(report.records[0].context.contains("Welcome to the home page"));
}

#[tokio::test]
async fn test_http_error_page_is_skipped() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page("Home", "Welcome to the home page of this small test site.", &["/missing", "/good"]),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/good", page("Good", "This page is fine and has content.", &["/missing"]), 1)
        .await;

    let dir = tempdir().unwrap();
    let output = dir.path().join("out.json");
    let report = run_crawl(test_request(&server.uri(), &output)).await.unwrap();

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.statistics.count(PageOutcome::HttpError), 1);
    assert_eq!(report.statistics.pages_requested(), 3);
    assert!(report.records[1].context.contains("This page is fine"));
}

#[tokio::test]
async fn test_only_same_origin_links_are_followed() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    let offsite = format!("{}/page", other.uri());

    mount_page(
        &server,
        "/",
        page("Home", "Welcome to the home page of this small test site.", &[&offsite, "/inner"]),
        1,
    )
    .await;
    mount_page(&server, "/inner", page("Inner", "The inner page stays on the site.", &[]), 1).await;
    mount_page(&other, "/page", page("Other", "A page on a different origin entirely.", &[]), 0)
        .await;

    let dir = tempdir().unwrap();
    let report = run_crawl(test_request(&server.uri(), &dir.path().join("out.json")))
        .await
        .unwrap();

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.statistics.links_enqueued, 1);
}

#[tokio::test]
async fn test_no_url_is_fetched_twice() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page("Home", "Welcome to the home page of this small test site.", &["/a", "/b", "/a"]),
        1,
    )
    .await;
    mount_page(&server, "/a", page("A", "Page A links back home and to B.", &["/", "/b"]), 1).await;
    mount_page(&server, "/b", page("B", "Page B links back home and to A.", &["/", "/a"]), 1).await;

    let dir = tempdir().unwrap();
    let report = run_crawl(test_request(&server.uri(), &dir.path().join("out.json")))
        .await
        .unwrap();

    assert_eq!(report.records.len(), 3);
    assert_eq!(report.statistics.pages_requested(), 3);
    assert_eq!(report.statistics.frontier_remaining, 0);
}

#[tokio::test]
async fn test_redirect_target_is_marked_visited() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page("Home", "Welcome to the home page of this small test site.", &["/old", "/new"]),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/new", page("New", "The page moved here a while ago.", &[]), 1).await;

    let dir = tempdir().unwrap();
    let report = run_crawl(test_request(&server.uri(), &dir.path().join("out.json")))
        .await
        .unwrap();

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.statistics.count(PageOutcome::AlreadyVisited), 1);
}

#[tokio::test]
async fn test_page_without_content_still_yields_links() {
    let server = MockServer::start().await;
    let menu_only = r#"<html><body><nav><a href="/article">Read</a></nav><p>Hi</p></body></html>"#;
    mount_page(&server, "/", menu_only.to_string(), 1).await;
    mount_page(
        &server,
        "/article",
        page("Article", "The real content of the site lives on this page.", &[]),
        1,
    )
    .await;

    let dir = tempdir().unwrap();
    let report = run_crawl(test_request(&server.uri(), &dir.path().join("out.json")))
        .await
        .unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.statistics.count(PageOutcome::NoContent), 1);
    assert!(report.records[0].context.contains("real content"));
}

#[tokio::test]
async fn test_fallback_records_without_generator() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page("Home", "Welcome to the home page of this small test site.", &["/a"]),
        1,
    )
    .await;
    mount_page(&server, "/a", page("A", "Page A has plenty of words in it.", &[]), 1).await;

    let dir = tempdir().unwrap();
    let report = run_crawl(test_request(&server.uri(), &dir.path().join("out.json")).with_max_chars(10))
        .await
        .unwrap();

    assert_eq!(report.records.len(), 2);
    for record in &report.records {
        assert_eq!(record.context.chars().count(), 10);
        assert_eq!(record.question, FALLBACK_SENTINEL);
        assert_eq!(record.answer, FALLBACK_SENTINEL);
    }
    assert_eq!(report.statistics.count(PageOutcome::Fallback), 2);
}

#[tokio::test]
async fn test_generated_records_with_fake_generator() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page("Home", "Welcome to the home page of this small test site.", &[]),
        1,
    )
    .await;

    let dir = tempdir().unwrap();
    let request = test_request(&server.uri(), &dir.path().join("out.json"))
        .with_generator(Arc::new(EchoGenerator));
    let report = run_crawl(request).await.unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(
        report.records[0].question,
        format!("What is on {}/?", server.uri())
    );
    assert_eq!(report.statistics.count(PageOutcome::Generated), 1);
}

#[tokio::test]
async fn test_gemini_generator_end_to_end() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page("Home", "Welcome to the home page of this small test site.", &[]),
        1,
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": "{\"question\": \"What is this site?\", \"answer\": \"A test site.\"}" }]
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let generator = GeminiGenerator::with_endpoint("test-key", "gemini-test", &server.uri()).unwrap();
    let dir = tempdir().unwrap();
    let request = test_request(&server.uri(), &dir.path().join("out.json"))
        .with_generator(Arc::new(generator));
    let report = run_crawl(request).await.unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].question, "What is this site?");
    assert_eq!(report.records[0].answer, "A test site.");
}

#[tokio::test]
async fn test_failing_generation_service_falls_back_after_retries() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page("Home", "Welcome to the home page of this small test site.", &[]),
        1,
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(3)
        .mount(&server)
        .await;

    let generator = GeminiGenerator::with_endpoint("test-key", "gemini-test", &server.uri()).unwrap();
    let dir = tempdir().unwrap();
    let request = test_request(&server.uri(), &dir.path().join("out.json"))
        .with_generator(Arc::new(generator));
    let report = run_crawl(request).await.unwrap();

    assert_eq!(report.records.len(), 1);
    assert!(report.records[0].is_fallback());
    assert_eq!(report.statistics.count(PageOutcome::Fallback), 1);
}

#[tokio::test]
async fn test_output_file_format() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page("Dessert", "Crème brûlée à 東京 is served in many cafés.", &[]),
        1,
    )
    .await;

    let dir = tempdir().unwrap();
    let output = dir.path().join("out.json");
    let report = run_crawl(test_request(&server.uri(), &output)).await.unwrap();
    assert!(report.is_persisted());

    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.starts_with("[\n    {\n        \"context\": "));
    assert!(content.contains("Crème brûlée à 東京"));

    let context_at = content.find("\"context\"").unwrap();
    let question_at = content.find("\"question\"").unwrap();
    let answer_at = content.find("\"answer\"").unwrap();
    assert!(context_at < question_at && question_at < answer_at);

    assert_eq!(load_records(&output).unwrap(), report.records);
}

#[tokio::test]
async fn test_persistence_failure_keeps_records_for_resave() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page("Home", "Welcome to the home page of this small test site.", &[]),
        1,
    )
    .await;

    let dir = tempdir().unwrap();
    let unwritable = dir.path().join("no-such-dir").join("out.json");
    let report = run_crawl(test_request(&server.uri(), &unwritable)).await.unwrap();

    assert_eq!(report.state, RunState::Completed);
    assert!(matches!(report.persisted, Some(Err(_))));
    assert_eq!(report.records.len(), 1);
    assert!(!unwritable.exists());

    let retry_path = dir.path().join("resaved.json");
    report.save_to(&retry_path).unwrap();
    assert_eq!(load_records(&retry_path).unwrap(), report.records);
}

#[tokio::test]
async fn test_cancellation_stops_the_run() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page("Home", "Welcome to the home page of this small test site.", &["/a"]),
        1,
    )
    .await;
    mount_page(&server, "/a", page("A", "Page A has plenty of words in it.", &[]), 0).await;

    let flag = Arc::new(AtomicBool::new(false));
    let trigger = Arc::clone(&flag);
    let dir = tempdir().unwrap();
    let request = test_request(&server.uri(), &dir.path().join("out.json"));

    let mut coordinator = Coordinator::new(request)
        .unwrap()
        .with_cancellation(Arc::clone(&flag))
        .with_progress(Arc::new(move |msg: &str| {
            if msg.starts_with("Collected 1/") {
                trigger.store(true, Ordering::SeqCst);
            }
        }));
    let report = coordinator.run().await;

    assert_eq!(report.state, RunState::Completed);
    assert!(report.statistics.cancelled);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.statistics.frontier_remaining, 1);
    assert!(report.is_persisted());
}

#[tokio::test]
async fn test_progress_messages_follow_the_loop() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page("Home", "Welcome to the home page of this small test site.", &["/a"]),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let seen = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = Arc::clone(&seen);
    let dir = tempdir().unwrap();
    let request = test_request(&server.uri(), &dir.path().join("out.json")).with_page_quota(2);

    let mut coordinator = Coordinator::new(request)
        .unwrap()
        .with_progress(Arc::new(move |msg: &str| {
            sink.lock().unwrap().push(msg.to_string());
        }));
    coordinator.run().await;

    let seen = seen.lock().unwrap();
    let position = |needle: &str| {
        seen.iter()
            .position(|msg| msg.contains(needle))
            .unwrap_or_else(|| panic!("missing progress message {:?} in {:#?}", needle, *seen))
    };

    let start = position("Starting crawl from");
    let fetch_seed = position(format!("Fetching {}", server.uri()).as_str());
    let extracted = position("Successfully extracted content");
    let skipped = position("Generation skipped");
    let tick = position("Collected 1/2 pages. URLs in queue: 1");
    let failed = position("Failed to fetch");
    let saved = position("Successfully saved 1 records");

    assert!(start < fetch_seed);
    assert!(fetch_seed < extracted);
    assert!(extracted < skipped);
    assert!(skipped < tick);
    assert!(tick < failed);
    assert!(failed < saved);
    assert!(seen[failed].contains("HTTP 503"));
}

#[tokio::test]
async fn test_invalid_seed_fails_without_network_or_output() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.json");
    let mut config = Config::default();
    config.output.path = output.display().to_string();
    config.crawler.request_delay_ms = 0;

    let report = crawl(&config, "mailto:someone@example.com", None).await.unwrap();

    assert_eq!(
        report.state,
        RunState::Failed(FailureReason::InvalidScheme(
            "mailto:someone@example.com".to_string()
        ))
    );
    assert!(report.records.is_empty());
    assert!(report.persisted.is_none());
    assert!(!output.exists());
}
