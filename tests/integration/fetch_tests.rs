use crate::test_config;
use std::time::{Duration, Instant};
use sumi_trawl::config::{ScraperConfig, UserAgentConfig};
use sumi_trawl::{FetchOutcome, Fetcher, PageSource, TrawlError};
use tempfile::TempDir;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(config: &ScraperConfig) -> Fetcher {
    Fetcher::new(config, &UserAgentConfig::default()).expect("Failed to build fetcher")
}

fn source(config: &ScraperConfig) -> PageSource {
    PageSource::from_config(config, &UserAgentConfig::default()).expect("Failed to build source")
}

#[tokio::test]
async fn test_not_found_becomes_empty_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());
    let url = format!("{}/missing", mock_server.uri());

    let outcome = fetcher(&config).fetch(&url).await.unwrap();
    assert_eq!(outcome, FetchOutcome::NotFound { status: 404 });

    let body = source(&config).get(url.as_str(), false).await.unwrap();
    assert_eq!(body, "");
}

#[tokio::test]
async fn test_server_error_becomes_empty_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());
    let url = format!("{}/broken", mock_server.uri());

    let outcome = fetcher(&config).fetch(&url).await.unwrap();
    assert_eq!(outcome, FetchOutcome::ServerError { status: 503 });
    assert_eq!(source(&config).get(url.as_str(), false).await.unwrap(), "");
}

#[tokio::test]
async fn test_accept_header_and_content_type_hint() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header_exists("accept"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<p>ok</p>".as_bytes(), "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let tmp = TempDir::new().unwrap();
    let outcome = fetcher(&test_config(tmp.path()))
        .fetch(&format!("{}/page", mock_server.uri()))
        .await
        .unwrap();

    match outcome {
        FetchOutcome::Page { body, content_type } => {
            assert_eq!(body, "<p>ok</p>");
            assert!(content_type.unwrap().starts_with("text/html"));
        }
        other => panic!("expected a page, got {:?}", other),
    }
}

#[tokio::test]
async fn test_text_without_charset_is_decoded_as_latin1() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latin"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"caf\xe9".to_vec(), "text/html"))
        .mount(&mock_server)
        .await;

    let tmp = TempDir::new().unwrap();
    let outcome = fetcher(&test_config(tmp.path()))
        .fetch(&format!("{}/latin", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(outcome.into_body(), "café");
}

#[tokio::test]
async fn test_latin1_keeps_c1_controls() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/c1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"a\x93b".to_vec(), "text/html"))
        .mount(&mock_server)
        .await;

    let tmp = TempDir::new().unwrap();
    let outcome = fetcher(&test_config(tmp.path()))
        .fetch(&format!("{}/c1", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(outcome.into_body(), "a\u{93}b");
}

#[tokio::test]
async fn test_text_xml_is_decoded_as_ascii() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"<r>caf\xe9</r>".to_vec(), "text/xml"),
        )
        .mount(&mock_server)
        .await;

    let tmp = TempDir::new().unwrap();
    let outcome = fetcher(&test_config(tmp.path()))
        .fetch(&format!("{}/feed.xml", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(outcome.into_body(), "<r>caf\u{FFFD}</r>");
}

#[tokio::test]
async fn test_explicit_ascii_charset_replaces_high_bytes() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ascii"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"x\xffy".to_vec(), "text/plain; charset=us-ascii"),
        )
        .mount(&mock_server)
        .await;

    let tmp = TempDir::new().unwrap();
    let outcome = fetcher(&test_config(tmp.path()))
        .fetch(&format!("{}/ascii", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(outcome.into_body(), "x\u{FFFD}y");
}

#[tokio::test]
async fn test_explicit_charset_is_honoured() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/utf8"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("café".as_bytes(), "text/html; charset=utf-8"),
        )
        .mount(&mock_server)
        .await;

    let tmp = TempDir::new().unwrap();
    let outcome = fetcher(&test_config(tmp.path()))
        .fetch(&format!("{}/utf8", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(outcome.into_body(), "café");
}

#[tokio::test]
async fn test_unresolved_charset_replaces_invalid_bytes() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blob"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(vec![b'o', b'k', 0xff], "application/json"),
        )
        .mount(&mock_server)
        .await;

    let tmp = TempDir::new().unwrap();
    let outcome = fetcher(&test_config(tmp.path()))
        .fetch(&format!("{}/blob", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(outcome.into_body(), "ok\u{FFFD}");
}

#[tokio::test]
async fn test_connection_failure_propagates() {
    let tmp = TempDir::new().unwrap();
    // Nothing listens on port 1
    let result = fetcher(&test_config(tmp.path()))
        .fetch("http://127.0.0.1:1/")
        .await;

    assert!(matches!(result, Err(TrawlError::Http { .. })));
}

#[tokio::test]
async fn test_delay_precedes_every_fetch() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let tmp = TempDir::new().unwrap();
    let config = ScraperConfig {
        delay_ms: 150,
        ..test_config(tmp.path())
    };
    let fetcher = fetcher(&config);

    let start = Instant::now();
    fetcher.fetch(&format!("{}/a", mock_server.uri())).await.unwrap();
    fetcher.fetch(&format!("{}/b", mock_server.uri())).await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_cache_serves_second_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>once</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let tmp = TempDir::new().unwrap();
    let source = source(&test_config(tmp.path()));
    let url = format!("{}/page", mock_server.uri());

    let first = source.get(url.as_str(), true).await.unwrap();
    let second = source.get(url.as_str(), true).await.unwrap();

    assert_eq!(first, "<p>once</p>");
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_without_cache_every_request_hits_network() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fresh"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());
    let source = source(&config);
    let url = format!("{}/page", mock_server.uri());

    source.get(url.as_str(), false).await.unwrap();
    source.get(url.as_str(), false).await.unwrap();

    assert!(!config.cache_dir.exists());
}

#[tokio::test]
async fn test_failed_fetch_is_cached() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let tmp = TempDir::new().unwrap();
    let source = source(&test_config(tmp.path()));
    let url = format!("{}/gone", mock_server.uri());

    assert_eq!(source.get(url.as_str(), true).await.unwrap(), "");
    assert_eq!(source.get(url.as_str(), true).await.unwrap(), "");
}

#[tokio::test]
async fn test_cache_file_is_named_after_sanitized_url() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/item"))
        .respond_with(ResponseTemplate::new(200).set_body_string("body"))
        .mount(&mock_server)
        .await;

    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());
    let source = source(&config);
    let url = format!("{}/item?id=7", mock_server.uri());

    source.get(url.as_str(), true).await.unwrap();

    let file = config.cache_dir.join(sumi_trawl::cache_key(&url));
    assert_eq!(std::fs::read_to_string(file).unwrap(), "body");
}
