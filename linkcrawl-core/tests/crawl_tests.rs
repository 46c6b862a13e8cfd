// Tests for crawl orchestration

use linkcrawl_core::crawl::{CrawlOptions, execute_crawl};
use linkcrawl_scanner::{CancellationToken, ScanError, normalize_url};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

async fn mount_html(mock_server: &MockServer, route: &str, body: &str, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_bytes(body.as_bytes())
                .set_delay(delay),
        )
        .mount(mock_server)
        .await;
}

#[test]
fn test_crawl_options_defaults() {
    let options = CrawlOptions::new("https://x.test/", 2, 10);
    assert_eq!(options.url, "https://x.test/");
    assert_eq!(options.max_concurrency, 2);
    assert_eq!(options.max_pages, 10);
    assert_eq!(options.queue_capacity, 1000);
    assert_eq!(options.timeout, Duration::from_secs(3));
    assert!(!options.show_progress_bars);
}

#[tokio::test]
async fn test_execute_crawl_reports_progress() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/",
        r#"<a href="/a">a</a><a href="/b">b</a><a href="https://other.test/c">c</a>"#,
        Duration::ZERO,
    )
    .await;
    mount_html(&mock_server, "/a", "<html></html>", Duration::ZERO).await;
    mount_html(&mock_server, "/b", "<html></html>", Duration::ZERO).await;

    let messages: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let messages_clone = messages.clone();

    let report = execute_crawl(
        CrawlOptions::new(mock_server.uri(), 2, 10),
        CancellationToken::new(),
        Some(Arc::new(move |msg: String| {
            messages_clone.lock().unwrap().push(msg);
        })),
    )
    .await
    .unwrap();

    let host = normalize_url(&mock_server.uri()).unwrap();
    assert_eq!(report.pages.get(&host), Some(&3));
    assert_eq!(report.pages.len(), 3);
    assert_eq!(report.skipped, vec!["https://other.test/c"]);
    assert_eq!(messages.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_execute_crawl_respects_max_pages() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/",
        r#"<a href="/1">1</a><a href="/2">2</a><a href="/3">3</a>"#,
        Duration::ZERO,
    )
    .await;
    for route in ["/1", "/2", "/3"] {
        mount_html(&mock_server, route, "<html></html>", Duration::ZERO).await;
    }

    let report = execute_crawl(
        CrawlOptions::new(mock_server.uri(), 1, 2),
        CancellationToken::new(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.pages.len(), 2);
}

#[tokio::test]
async fn test_execute_crawl_cancelled() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", r#"<a href="/slow">s</a>"#, Duration::ZERO).await;
    mount_html(&mock_server, "/slow", "<html></html>", Duration::from_secs(2)).await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let report = execute_crawl(CrawlOptions::new(mock_server.uri(), 2, 10), cancel, None)
        .await
        .unwrap();

    assert!(report.interrupted);
    assert_eq!(report.pages.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_execute_crawl_cancellation_is_always_reported() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", r#"<a href="/slow">s</a>"#, Duration::ZERO).await;
    mount_html(&mock_server, "/slow", "<html></html>", Duration::from_secs(3)).await;

    for round in 0..20 {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let report = tokio::time::timeout(
            Duration::from_secs(5),
            execute_crawl(CrawlOptions::new(mock_server.uri(), 2, 10), cancel, None),
        )
        .await
        .expect("cancelled crawl did not return")
        .unwrap();

        assert!(report.interrupted, "round {} was not reported as interrupted", round);
        assert!(report.pages.len() <= 1);
    }
}

#[tokio::test]
async fn test_execute_crawl_invalid_url() {
    let err = execute_crawl(
        CrawlOptions::new("not a url", 1, 1),
        CancellationToken::new(),
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ScanError::InvalidUrl(_)));
}
