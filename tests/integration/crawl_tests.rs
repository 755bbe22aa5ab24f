//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use statute_crawler::config::{Config, CrawlerConfig, RetryConfig, UserAgentConfig};
use statute_crawler::crawler::{build_http_client, crawl, Fetcher, NoopObserver};
use statute_crawler::{CrawlError, CrawlNode, CrawlObserver, Crawler, NodeKind, RetrievalTarget};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration starting at the given URL
fn create_test_config(start_url: &str, concurrency: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            start_url: start_url.to_string(),
            max_concurrent_children: concurrency,
            request_timeout_secs: 5,
        },
        retry: RetryConfig {
            initial_interval_ms: 10,
            max_interval_ms: 50,
            multiplier: 2.0,
            max_elapsed_ms: 200,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
    }
}

/// Observer that records every event it receives
#[derive(Default)]
struct RecordingObserver {
    visited: Mutex<Vec<(NodeKind, String)>>,
    skipped: Mutex<Vec<String>>,
}

impl CrawlObserver for RecordingObserver {
    fn node_visited(&self, kind: NodeKind, target: &RetrievalTarget) {
        self.visited
            .lock()
            .unwrap()
            .push((kind, target.path().to_string()));
    }

    fn child_skipped(&self, target: &RetrievalTarget, _error: &CrawlError) {
        self.skipped.lock().unwrap().push(target.path().to_string());
    }
}

fn crawler(config: &Config, cancel: CancellationToken) -> Crawler {
    let client = build_http_client(config).expect("Failed to build client");
    let fetcher = Fetcher::new(client, config.retry.clone(), cancel);
    Crawler::new(fetcher)
        .with_max_concurrent_children(config.crawler.max_concurrent_children as usize)
        .with_observer(Arc::new(NoopObserver))
}

fn root_target(server: &MockServer) -> RetrievalTarget {
    RetrievalTarget::parse(&format!("{}/", server.uri())).expect("Failed to parse root")
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

/// An index page whose name cells link to `hrefs`, plus a citation and a
/// classed reference link that must never be followed
fn index_page(title: &str, hrefs: &[&str]) -> String {
    let rows: String = hrefs
        .iter()
        .map(|href| {
            format!(
                r#"<tr>
                    <td class="name-cell"><a href="{0}">Go to {0}</a></td>
                    <td class="name-cell"><a href="/cite{0}" target="_blank">Cite</a></td>
                    <td class="name-cell"><a href="/ref{0}" class="ref-link">Ref</a></td>
                </tr>"#,
                href
            )
        })
        .collect();

    format!(
        r#"<html><body><h1>{}</h1><table>{}</table></body></html>"#,
        title, rows
    )
}

/// A leaf table holding one section per title, each with two info values
fn leaf_table(title: &str, sections: &[&str]) -> String {
    let cells: String = sections
        .iter()
        .map(|section| {
            format!(
                r#"<tr><td class="name-cell">
                    <div class="content-head-text"><a href="/section-{0}">Section {0}</a></div>
                    <div class="laws-section-info-module no-print"><span class="value">print only</span></div>
                    <div class="laws-section-info-module">
                        <div><span class="label">Effective:</span><span class="value">October 1, 1953</span></div>
                        <div><span class="label">Latest Legislation:</span><span class="value">House Bill {0}</span></div>
                    </div>
                    <div class="laws-body">
                        <span><p>Text of section {0}.</p></span>
                        <span><p>Second paragraph of {0}.</p></span>
                    </div>
                    <div class="laws-notice"><p>Available Versions of this Section</p></div>
                </td></tr>"#,
                section
            )
        })
        .collect();

    format!(
        r#"<html><body><h1>{}</h1><button id="expand-all-button">Expand all</button><table>{}</table></body></html>"#,
        title, cells
    )
}

async fn mount_page(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .expect(1)
        .mount(server)
        .await;
}

fn titles(nodes: &[CrawlNode]) -> Vec<&str> {
    nodes.iter().map(|n| n.title()).collect()
}

#[tokio::test]
async fn test_unreachable_child_is_skipped() {
    let server = MockServer::start().await;

    mount_page(&server, "/", index_page("Revised Code", &["/a", "/b", "/c"])).await;
    mount_page(&server, "/a", leaf_table("Chapter A", &["1.01"])).await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/c", leaf_table("Chapter C", &["3.01"])).await;

    let config = create_test_config(&format!("{}/", server.uri()), 1);
    let observer = Arc::new(RecordingObserver::default());
    let crawler = crawler(&config, CancellationToken::new()).with_observer(observer.clone());

    let tree = crawler
        .crawl(&root_target(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(tree.title(), "Revised Code");
    assert_eq!(titles(tree.children()), vec!["Chapter A", "Chapter C"]);

    let a = &tree.children()[0];
    assert_eq!(titles(a.children()), vec!["Section 1.01"]);
    assert!(a.children()[0].is_leaf());

    assert_eq!(*observer.skipped.lock().unwrap(), vec!["/b".to_string()]);
    assert_eq!(
        *observer.visited.lock().unwrap(),
        vec![
            (NodeKind::Index, "/".to_string()),
            (NodeKind::Terminal, "/a".to_string()),
            (NodeKind::Terminal, "/c".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_leaf_table_needs_no_further_fetch() {
    let server = MockServer::start().await;

    mount_page(&server, "/", leaf_table("Chapter 1", &["1.01", "1.02"])).await;

    let config = create_test_config(&format!("{}/", server.uri()), 1);
    let tree = crawler(&config, CancellationToken::new())
        .crawl(&root_target(&server))
        .await
        .expect("Crawl failed");

    let index = tree.as_index().expect("Leaf table should be an index node");
    assert_eq!(index.title, "Chapter 1");
    assert_eq!(index.children.len(), 2);

    for (child, section) in index.children.iter().zip(["1.01", "1.02"]) {
        let leaf = child.as_leaf().expect("Children should be leaves");
        assert_eq!(leaf.title, format!("Section {}", section));
        assert_eq!(leaf.effective_date, "October 1, 1953");
        assert_eq!(leaf.latest_action, format!("House Bill {}", section));
        assert_eq!(
            leaf.body_paragraphs,
            vec![
                format!("Text of section {}.", section),
                format!("Second paragraph of {}.", section),
            ]
        );
        assert_eq!(leaf.footer_notice, "Available Versions of this Section");
    }

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_concurrent_children_keep_document_order() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        index_page("Revised Code", &["/title-1", "/title-2", "/title-3"]),
    )
    .await;
    mount_page(
        &server,
        "/title-1",
        index_page("Title 1", &["/chapter-101", "/chapter-102"]),
    )
    .await;

    // The first links answer slowest, so completion order is reversed
    Mock::given(method("GET"))
        .and(path("/chapter-101"))
        .respond_with(
            html(leaf_table("Chapter 101", &["101.01"])).set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/chapter-102", leaf_table("Chapter 102", &["102.01"])).await;
    Mock::given(method("GET"))
        .and(path("/title-2"))
        .respond_with(
            html(leaf_table("Title 2", &["2.01", "2.02"])).set_delay(Duration::from_millis(150)),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/title-3", leaf_table("Title 3", &["3.01"])).await;

    let config = create_test_config(&format!("{}/", server.uri()), 4);
    let tree = crawler(&config, CancellationToken::new())
        .crawl(&root_target(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(titles(tree.children()), vec!["Title 1", "Title 2", "Title 3"]);
    assert_eq!(
        titles(tree.children()[0].children()),
        vec!["Chapter 101", "Chapter 102"]
    );
    assert_eq!(
        titles(tree.children()[1].children()),
        vec!["Section 2.01", "Section 2.02"]
    );
}

/// Mounts a leaf table that answers after `delay`
async fn mount_slow_page(server: &MockServer, page: &str, body: String, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body).set_delay(delay))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_concurrency_limit_holds_across_levels() {
    let server = MockServer::start().await;
    let delay = Duration::from_millis(200);

    mount_page(&server, "/", index_page("Revised Code", &["/title-1", "/title-2"])).await;
    for title in ["1", "2"] {
        let chapters: Vec<String> = (1..=4)
            .map(|c| format!("/title-{}/chapter-{}", title, c))
            .collect();
        let hrefs: Vec<&str> = chapters.iter().map(String::as_str).collect();
        mount_page(
            &server,
            &format!("/title-{}", title),
            index_page(&format!("Title {}", title), &hrefs),
        )
        .await;

        for chapter in &chapters {
            mount_slow_page(&server, chapter, leaf_table(chapter, &["1.01"]), delay).await;
        }
    }

    // Two titles each listing four chapters: with at most two requests in
    // flight crawl-wide, the eight slow chapters take four rounds
    let config = create_test_config(&format!("{}/", server.uri()), 2);
    let started = Instant::now();
    let tree = crawler(&config, CancellationToken::new())
        .crawl(&root_target(&server))
        .await
        .expect("Crawl failed");
    let elapsed = started.elapsed();

    assert!(
        elapsed >= delay * 4,
        "eight slow pages under a limit of two finished in {:?}",
        elapsed
    );
    assert_eq!(titles(tree.children()), vec!["Title 1", "Title 2"]);
    assert_eq!(
        titles(tree.children()[1].children()),
        vec![
            "/title-2/chapter-1",
            "/title-2/chapter-2",
            "/title-2/chapter-3",
            "/title-2/chapter-4",
        ]
    );
}

#[tokio::test]
async fn test_sequential_crawl_fetches_one_page_at_a_time() {
    let server = MockServer::start().await;
    let delay = Duration::from_millis(150);

    mount_page(&server, "/", index_page("Revised Code", &["/a", "/b", "/c"])).await;
    for page in ["/a", "/b", "/c"] {
        mount_slow_page(&server, page, leaf_table(page, &["1.01"]), delay).await;
    }

    let config = create_test_config(&format!("{}/", server.uri()), 1);
    let started = Instant::now();
    let tree = crawler(&config, CancellationToken::new())
        .crawl(&root_target(&server))
        .await
        .expect("Crawl failed");

    assert!(started.elapsed() >= delay * 3);
    assert_eq!(titles(tree.children()), vec!["/a", "/b", "/c"]);
}

#[tokio::test]
async fn test_non_http_links_are_ignored() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        index_page(
            "Revised Code",
            &["/a", "javascript:void(0)", "mailto:clerk@example.com", "/b"],
        ),
    )
    .await;
    mount_page(&server, "/a", leaf_table("Chapter A", &["1.01"])).await;
    mount_page(&server, "/b", leaf_table("Chapter B", &["2.01"])).await;

    let config = create_test_config(&format!("{}/", server.uri()), 2);
    let tree = crawler(&config, CancellationToken::new())
        .crawl(&root_target(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(titles(tree.children()), vec!["Chapter A", "Chapter B"]);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_exhausted_child_is_skipped() {
    let server = MockServer::start().await;

    mount_page(&server, "/", index_page("Revised Code", &["/one", "/two", "/three"])).await;
    mount_page(&server, "/one", leaf_table("One", &["1.01"])).await;
    Mock::given(method("GET"))
        .and(path("/two"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_page(&server, "/three", leaf_table("Three", &["3.01"])).await;

    let config = create_test_config(&format!("{}/", server.uri()), 2);
    let tree = crawler(&config, CancellationToken::new())
        .crawl(&root_target(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(titles(tree.children()), vec!["One", "Three"]);
}

#[tokio::test]
async fn test_non_html_child_is_skipped() {
    let server = MockServer::start().await;

    mount_page(&server, "/", index_page("Revised Code", &["/doc.pdf", "/ok"])).await;
    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/ok", leaf_table("Ok", &["1.01"])).await;

    let config = create_test_config(&format!("{}/", server.uri()), 1);
    let tree = crawler(&config, CancellationToken::new())
        .crawl(&root_target(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(titles(tree.children()), vec!["Ok"]);
}

#[tokio::test]
async fn test_root_failure_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&format!("{}/", server.uri()), 1);
    let result = crawler(&config, CancellationToken::new())
        .crawl(&root_target(&server))
        .await;

    assert!(matches!(result, Err(CrawlError::Permanent { status: 403, .. })));
}

#[tokio::test]
async fn test_malformed_reference_is_fatal() {
    let server = MockServer::start().await;

    mount_page(&server, "/", index_page("Revised Code", &["/good", "/broken"])).await;
    mount_page(&server, "/good", leaf_table("Good", &["1.01"])).await;
    mount_page(&server, "/broken", index_page("Broken", &["http://[::1"])).await;

    let config = create_test_config(&format!("{}/", server.uri()), 1);
    let result = crawler(&config, CancellationToken::new())
        .crawl(&root_target(&server))
        .await;

    assert!(matches!(
        result,
        Err(CrawlError::MalformedReference { ref href, .. }) if href == "http://[::1"
    ));
}

#[tokio::test]
async fn test_index_without_links_is_empty() {
    let server = MockServer::start().await;

    mount_page(&server, "/", index_page("Reserved", &[])).await;

    let config = create_test_config(&format!("{}/", server.uri()), 1);
    let tree = crawler(&config, CancellationToken::new())
        .crawl(&root_target(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(tree.title(), "Reserved");
    assert!(tree.as_index().unwrap().children.is_empty());
}

#[tokio::test]
async fn test_cancelled_crawl_returns_no_tree() {
    let server = MockServer::start().await;

    mount_page(&server, "/", index_page("Revised Code", &["/slow", "/never"])).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html(leaf_table("Slow", &["1.01"])).set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/never"))
        .respond_with(html(leaf_table("Never", &["2.01"])))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&format!("{}/", server.uri()), 1);
    let cancel = CancellationToken::new();
    let crawler = crawler(&config, cancel.clone());

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        crawler.crawl(&root_target(&server)),
    )
    .await
    .expect("Cancellation should stop the crawl promptly");

    assert!(matches!(result, Err(CrawlError::Cancelled)));
}

#[tokio::test]
async fn test_crawl_from_config() {
    let server = MockServer::start().await;

    mount_page(&server, "/ohio-revised-code", index_page("Ohio Revised Code", &["ohio-revised-code/title-1"])).await;
    mount_page(
        &server,
        "/ohio-revised-code/title-1",
        leaf_table("Title 1", &["1.01"]),
    )
    .await;

    let config = create_test_config(&format!("{}/ohio-revised-code", server.uri()), 2);
    let tree = crawl(&config, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(tree.title(), "Ohio Revised Code");
    assert_eq!(titles(tree.children()), vec!["Title 1"]);
}
