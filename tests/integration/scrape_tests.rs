use crate::test_config;
use std::sync::{Arc, Mutex};
use sumi_trawl::config::UserAgentConfig;
use sumi_trawl::{IndexResolver, PageSource, ScraperBuilder, SelectorMethod, TrawlError};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_index_links_are_extracted_in_order() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/list",
        r#"<html><body><a href="/p1">A</a><a href="/p2">B</a></body></html>"#,
    )
    .await;

    let tmp = TempDir::new().unwrap();
    let mut scraper = ScraperBuilder::from_index(
        format!("{}/list", mock_server.uri()),
        "//a",
        SelectorMethod::XPath,
    )
    .config(test_config(tmp.path()))
    .build()
    .unwrap();

    let urls = scraper.instance_urls().await.unwrap();
    assert_eq!(urls, ["/p1", "/p2"]);
}

#[tokio::test]
async fn test_index_links_with_css_selector() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/list",
        r#"<ul><li><a class="item" href="/x">X</a></li><li><a href="/skip">S</a></li><li><a class="item" href="/y">Y</a></li></ul>"#,
    )
    .await;

    let tmp = TempDir::new().unwrap();
    let mut scraper = ScraperBuilder::from_index(
        format!("{}/list", mock_server.uri()),
        "a.item",
        SelectorMethod::Css,
    )
    .config(test_config(tmp.path()))
    .build()
    .unwrap();

    assert_eq!(scraper.instance_urls().await.unwrap(), ["/x", "/y"]);
}

#[tokio::test]
async fn test_invalid_index_selector_fails_at_build() {
    let tmp = TempDir::new().unwrap();
    let result = ScraperBuilder::from_index("http://localhost/list", "//a[", SelectorMethod::XPath)
        .config(test_config(tmp.path()))
        .build();

    assert!(matches!(result, Err(TrawlError::Query(_))));
}

#[tokio::test]
async fn test_index_pagination_starts_at_page_two() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/list", r#"<a href="/p1">1</a>"#).await;
    mount_page(&mock_server, "/list/2", r#"<a href="/p2">2</a>"#).await;
    mount_page(&mock_server, "/list/3", r#"<a href="/p3">3</a>"#).await;

    let tmp = TempDir::new().unwrap();
    let base = mock_server.uri();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorded = seen.clone();

    let mut scraper = ScraperBuilder::from_index(format!("{}/list", base), "//a", SelectorMethod::XPath)
        .config(test_config(tmp.path()))
        .index_pagination(move |url: &str, page: u32| {
            recorded.lock().unwrap().push(page);
            if page <= 3 {
                format!("{}/list/{}", base, page)
            } else {
                url.to_string()
            }
        })
        .build()
        .unwrap();

    let urls = scraper.instance_urls().await.unwrap();

    assert_eq!(urls, ["/p1", "/p2", "/p3"]);
    assert_eq!(*seen.lock().unwrap(), vec![2, 3, 4]);
}

#[tokio::test]
async fn test_instance_pagination_starts_at_page_one() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/item", "<p>first</p>").await;
    mount_page(&mock_server, "/item/more", "<p>second</p>").await;

    let tmp = TempDir::new().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorded = seen.clone();

    let mut scraper = ScraperBuilder::from_instances(vec![format!("{}/item", mock_server.uri())])
        .config(test_config(tmp.path()))
        .instance_pagination(move |url: &str, page: u32| {
            recorded.lock().unwrap().push(page);
            if url.ends_with("/item") {
                format!("{}/more", url)
            } else {
                url.to_string()
            }
        })
        .build()
        .unwrap();

    let bodies = scraper.run(|body, _, _| body.to_string()).await.unwrap();

    assert_eq!(bodies, vec!["<p>first</p><p>second</p>"]);
    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
}

#[tokio::test]
async fn test_records_match_instance_order() {
    let mock_server = MockServer::start().await;
    for name in ["a", "b", "c"] {
        mount_page(&mock_server, &format!("/{}", name), name).await;
    }

    let tmp = TempDir::new().unwrap();
    let urls: Vec<String> = ["c", "a", "b"]
        .iter()
        .map(|name| format!("{}/{}", mock_server.uri(), name))
        .collect();

    let mut scraper = ScraperBuilder::from_instances(urls.clone())
        .config(test_config(tmp.path()))
        .build()
        .unwrap();

    let records = scraper
        .run(|_, url, _| vec![url.to_string()])
        .await
        .unwrap();

    let expected: Vec<Vec<String>> = urls.into_iter().map(|u| vec![u]).collect();
    assert_eq!(records, expected);
}

#[tokio::test]
async fn test_missing_instance_still_produces_record() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/ok", "<p>ok</p>").await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let tmp = TempDir::new().unwrap();
    let mut scraper = ScraperBuilder::from_instances(vec![
        format!("{}/ok", mock_server.uri()),
        format!("{}/missing", mock_server.uri()),
    ])
    .config(test_config(tmp.path()))
    .build()
    .unwrap();

    let lengths = scraper.run(|body, _, _| body.len()).await.unwrap();
    assert_eq!(lengths, vec![9, 0]);
}

#[tokio::test]
async fn test_absolute_links_are_fetched_end_to_end() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/list",
        r##"<a href="/items/1">1</a><a href="#top">top</a><a href="/items/2">2</a>"##,
    )
    .await;
    mount_page(&mock_server, "/items/1", "<h1>One</h1>").await;
    mount_page(&mock_server, "/items/2", "<h1>Two</h1>").await;

    let tmp = TempDir::new().unwrap();
    let mut scraper = ScraperBuilder::from_index(
        format!("{}/list", mock_server.uri()),
        "//a",
        SelectorMethod::XPath,
    )
    .config(test_config(tmp.path()))
    .absolute_links(true)
    .build()
    .unwrap();

    let titles = scraper
        .run(|body, _, _| {
            sumi_trawl::query::select_text(body, "//h1", SelectorMethod::XPath).unwrap()
        })
        .await
        .unwrap();

    assert_eq!(
        titles,
        vec![vec!["One".to_string()], vec!["Two".to_string()]]
    );
}

#[tokio::test]
async fn test_run_to_table_writes_csv() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/a", "alpha").await;
    mount_page(&mock_server, "/b", "beta, gamma").await;

    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out.csv");
    let mut scraper = ScraperBuilder::from_instances(vec![
        format!("{}/a", mock_server.uri()),
        format!("{}/b", mock_server.uri()),
    ])
    .config(test_config(tmp.path()))
    .build()
    .unwrap();

    let rows = scraper
        .run_to_table(|body, _, position| vec![position.to_string(), body.to_string()], &out)
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "0,alpha\n1,\"beta, gamma\"\n"
    );
}

#[tokio::test]
async fn test_stashed_instances_survive_a_second_scrape() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/item"))
        .respond_with(ResponseTemplate::new(200).set_body_string("stashed"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let tmp = TempDir::new().unwrap();
    let config = sumi_trawl::ScraperConfig {
        stash: true,
        ..test_config(tmp.path())
    };
    let urls = vec![format!("{}/item", mock_server.uri())];

    for _ in 0..2 {
        let mut scraper = ScraperBuilder::from_instances(urls.clone())
            .config(config.clone())
            .build()
            .unwrap();
        let bodies = scraper.run(|body, _, _| body.to_string()).await.unwrap();
        assert_eq!(bodies, vec!["stashed"]);
    }
}

#[tokio::test]
async fn test_cached_index_is_fetched_once() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"<a href="/p1">1</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let tmp = TempDir::new().unwrap();
    let config = sumi_trawl::ScraperConfig {
        cache_index: true,
        ..test_config(tmp.path())
    };

    for _ in 0..2 {
        let mut scraper = ScraperBuilder::from_index(
            format!("{}/list", mock_server.uri()),
            "//a",
            SelectorMethod::XPath,
        )
        .config(config.clone())
        .build()
        .unwrap();
        assert_eq!(scraper.instance_urls().await.unwrap(), ["/p1"]);
    }
}

#[tokio::test]
async fn test_page_source_accepts_index_resolver() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/first", "first index").await;
    mount_page(&mock_server, "/second", "second index").await;

    let tmp = TempDir::new().unwrap();
    let resolver = IndexResolver::new(
        vec![
            format!("{}/first", mock_server.uri()),
            format!("{}/second", mock_server.uri()),
        ],
        "//a",
        SelectorMethod::XPath,
    )
    .unwrap();
    let source = PageSource::from_config(&test_config(tmp.path()), &UserAgentConfig::default()).unwrap();

    let body = source.get(&resolver, false).await.unwrap();
    assert_eq!(body, "first index");
}
