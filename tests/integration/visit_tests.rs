//! Integration tests for the visitor
//!
//! These tests use wiremock to create mock HTTP servers and run whole visits
//! through the real reqwest-backed client.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url_visitor::config::{load_config, validate, Config};
use url_visitor::shutdown::{spawn_shutdown_listener, ShutdownReason};
use url_visitor::source::UrlSource;
use url_visitor::{Coordinator, ReqwestClient, RunState, UrlValidator, VisitorError};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_AGENT: &str = "TestVisitor/1.0";

/// Creates a test configuration with the given pool size and request timeout
fn create_test_config(concurrency: usize, timeout_secs: u64) -> Config {
    let mut config = Config::default();
    config.visitor.concurrency = concurrency;
    config.visitor.request_timeout_secs = timeout_secs;
    config.user_agent.header = TEST_AGENT.to_string();
    config
}

fn create_coordinator(config: &Config) -> Coordinator {
    let client = ReqwestClient::new(config.visitor.request_timeout())
        .expect("Failed to build HTTP client");
    Coordinator::new(Arc::new(client), config).expect("Failed to create coordinator")
}

fn validator() -> Arc<UrlValidator> {
    Arc::new(UrlValidator::new().expect("Failed to build validator"))
}

async fn mount_body(server: &MockServer, route: &str, status: u16, size: usize) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_bytes(vec![b'x'; size]))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_report_ordered_by_body_size() {
    let server = MockServer::start().await;
    mount_body(&server, "/small", 200, 12).await;
    mount_body(&server, "/large", 200, 4096).await;
    mount_body(&server, "/medium", 200, 300).await;

    let config = create_test_config(2, 5);
    let coordinator = create_coordinator(&config);
    let base = server.uri();
    let source = UrlSource::from_args(vec![
        format!("{}/small", base),
        format!("{}/large", base),
        format!("{}/medium", base),
    ]);

    let report = coordinator
        .visit(source, validator(), CancellationToken::new())
        .await
        .expect("Visit failed");

    let lines: Vec<String> = report.lines().collect();
    assert_eq!(
        lines,
        vec![
            format!("URL: {}/large => BodySize: 4096", base),
            format!("URL: {}/medium => BodySize: 300", base),
            format!("URL: {}/small => BodySize: 12", base),
        ]
    );
    assert!(report.outcomes().iter().all(|o| o.status_code == 200));
    assert_eq!(coordinator.state(), RunState::Done);
}

#[tokio::test]
async fn test_error_status_recorded_without_body() {
    let server = MockServer::start().await;
    mount_body(&server, "/missing", 404, 500).await;
    mount_body(&server, "/down", 503, 500).await;

    let config = create_test_config(2, 5);
    let coordinator = create_coordinator(&config);
    let base = server.uri();
    let source = UrlSource::from_args(vec![format!("{}/missing", base), format!("{}/down", base)]);

    let report = coordinator
        .visit(source, validator(), CancellationToken::new())
        .await
        .expect("Visit failed");

    assert_eq!(report.len(), 2);
    assert!(report.outcomes().iter().all(|o| o.body_size == 0));

    let mut statuses: Vec<u16> = report.outcomes().iter().map(|o| o.status_code).collect();
    statuses.sort();
    assert_eq!(statuses, vec![404, 503]);
}

#[tokio::test]
async fn test_timed_out_request_is_dropped() {
    let server = MockServer::start().await;
    mount_body(&server, "/fast", 200, 10).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = create_test_config(2, 1);
    let coordinator = create_coordinator(&config);
    let base = server.uri();
    let source = UrlSource::from_args(vec![format!("{}/slow", base), format!("{}/fast", base)]);

    let report = coordinator
        .visit(source, validator(), CancellationToken::new())
        .await
        .expect("Visit failed");

    assert_eq!(report.len(), 1);
    assert_eq!(report.outcomes()[0].url.to_string(), format!("{}/fast", base));

    let stats = coordinator.stats().snapshot();
    assert_eq!(stats.visits_dropped, 1);
    assert_eq!(stats.visits_completed, 1);
}

#[tokio::test]
async fn test_user_agent_header_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", TEST_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(3)
        .mount(&server)
        .await;

    let config = create_test_config(3, 5);
    let coordinator = create_coordinator(&config);
    let base = server.uri();
    let source = UrlSource::from_args((1..=3).map(|i| format!("{}/page{}", base, i)));

    let report = coordinator
        .visit(source, validator(), CancellationToken::new())
        .await
        .expect("Visit failed");

    assert_eq!(report.len(), 3);
    assert!(report.outcomes().iter().all(|o| o.body_size == 2));
}

#[tokio::test]
async fn test_deadline_cancels_slow_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("slow")
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let config = create_test_config(2, 30);
    let coordinator = create_coordinator(&config);
    let base = server.uri();
    let source = UrlSource::from_args((1..=4).map(|i| format!("{}/slow{}", base, i)));

    let cancel = CancellationToken::new();
    let listener = spawn_shutdown_listener(cancel.clone(), Some(Duration::from_millis(200)));

    let started = std::time::Instant::now();
    let result = coordinator.visit(source, validator(), cancel).await;

    assert!(matches!(result, Err(VisitorError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(coordinator.state(), RunState::Done);
    assert_eq!(listener.await.unwrap(), Some(ShutdownReason::Deadline));
}

#[tokio::test]
async fn test_urls_read_line_by_line() {
    let server = MockServer::start().await;
    mount_body(&server, "/a", 200, 5).await;
    mount_body(&server, "/b", 200, 50).await;

    let config = create_test_config(1, 5);
    let coordinator = create_coordinator(&config);
    let base = server.uri();
    let input = format!("{base}/a\n\nnot a url\n  {base}/b  \n", base = base);
    let source = UrlSource::from_reader(std::io::Cursor::new(input.into_bytes()));

    let report = coordinator
        .visit(source, validator(), CancellationToken::new())
        .await
        .expect("Visit failed");

    let sizes: Vec<u64> = report.outcomes().iter().map(|o| o.body_size).collect();
    assert_eq!(sizes, vec![50, 5]);

    let stats = coordinator.stats().snapshot();
    assert_eq!(stats.urls_accepted, 2);
    assert_eq!(stats.urls_rejected, 1);
}

#[tokio::test]
async fn test_config_file_drives_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "FileAgent/2.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .expect(1)
        .mount(&server)
        .await;

    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    writeln!(
        file,
        "[visitor]\nconcurrency = 3\nrequest-timeout-secs = 4\n\n[user-agent]\nheader = \"FileAgent/2.0\""
    )
    .expect("Failed to write config");

    let config = load_config(file.path()).expect("Failed to load config");
    validate(&config).expect("Config should be valid");
    assert_eq!(config.visitor.concurrency, 3);

    let coordinator = create_coordinator(&config);
    let source = UrlSource::from_args(vec![server.uri()]);

    let report = coordinator
        .visit(source, validator(), CancellationToken::new())
        .await
        .expect("Visit failed");

    assert_eq!(report.len(), 1);
    assert_eq!(report.outcomes()[0].body_size, 5);
}
