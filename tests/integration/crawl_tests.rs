//! Crawl engine tests against a mock site

use crate::common::{dump_lines, fast_gate, mount_page, mount_page_expecting};
use leakwatch::analysis::LeakSignal;
use leakwatch::{CrawlParams, Crawler};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn params(server: &MockServer, keywords: &[&str]) -> CrawlParams {
    CrawlParams {
        start_url: Url::parse(&server.uri()).unwrap(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        max_pages: 50,
        min_priority_to_expand: 3,
        include_subdomains: false,
        time_limit: Duration::from_secs(30),
        max_depth: 2,
    }
}

fn link(href: &str, text: &str) -> String {
    format!("<a href=\"{}\">{}</a>", href, text)
}

#[tokio::test]
async fn test_unreachable_home_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let crawler = Crawler::new(fast_gate());
    let report = crawler.crawl(&params(&server, &["leak"])).await;

    assert_eq!(report.unreachable.as_deref(), Some("HTTP 500"));
    assert!(!report.found);
    assert!(report.findings.is_empty());
    assert_eq!(report.pages_scanned, 0);
    assert_eq!(report.max_depth_reached, 0);
}

#[tokio::test]
async fn test_start_url_is_reduced_to_home_page() {
    let server = MockServer::start().await;
    mount_page_expecting(&server, "/", "<p>Welcome</p>", 1).await;
    mount_page_expecting(&server, "/deep/start", "<p>never</p>", 0).await;

    let mut params = params(&server, &["leak"]);
    params.start_url = Url::parse(&format!("{}/deep/start?q=1", server.uri())).unwrap();

    let report = Crawler::new(fast_gate()).crawl(&params).await;

    assert!(report.unreachable.is_none());
    assert_eq!(report.site_origin, server.uri());
    assert_eq!(report.pages_scanned, 0);
}

#[tokio::test]
async fn test_high_scoring_branch_reaches_depth_three() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &link("/vendor/123", "Vendor Profile")).await;
    mount_page(&server, "/vendor/123", &link("/vendor/123/market", "Market")).await;
    mount_page(&server, "/vendor/123/market", &link("/vendor/123/market/shop", "Shop")).await;
    mount_page(
        &server,
        "/vendor/123/market/shop",
        &link("/vendor/123/market/shop/deeper", "Vendor shop"),
    )
    .await;
    mount_page_expecting(&server, "/vendor/123/market/shop/deeper", "<p>too deep</p>", 0).await;

    // the configured depth does not cap the adaptive ceiling
    let mut params = params(&server, &["leak"]);
    params.max_depth = 1;

    let report = Crawler::new(fast_gate()).crawl(&params).await;

    assert_eq!(report.pages_scanned, 3);
    assert_eq!(report.max_depth_reached, 3);
}

#[tokio::test]
async fn test_low_score_page_is_not_expanded() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &link("/news", "Market news")).await;
    mount_page(&server, "/news", &link("/news/vendor", "Vendor")).await;
    mount_page_expecting(&server, "/news/vendor", "<p>child</p>", 0).await;

    let report = Crawler::new(fast_gate()).crawl(&params(&server, &["leak"])).await;

    assert_eq!(report.pages_scanned, 1);
    assert_eq!(report.max_depth_reached, 1);
}

#[tokio::test]
async fn test_leak_signals_force_expansion() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &link("/news", "Market news")).await;
    mount_page(
        &server,
        "/news",
        &format!(
            "<p>Reach admin@example.org for the archive</p>{}",
            link("/news/vendor", "Vendor")
        ),
    )
    .await;
    mount_page_expecting(&server, "/news/vendor", "<p>child</p>", 1).await;

    let report = Crawler::new(fast_gate()).crawl(&params(&server, &["archive"])).await;

    assert_eq!(report.pages_scanned, 2);
    assert_eq!(report.max_depth_reached, 2);
    assert!(report.found);
    assert_eq!(report.findings.len(), 1);

    let finding = &report.findings[0];
    assert_eq!(finding.url, format!("{}/news", server.uri()));
    assert_eq!(finding.leak_signals.get(LeakSignal::Emails), 1);
    assert_eq!(finding.found_keywords, vec!["archive"]);
}

#[tokio::test]
async fn test_login_link_is_never_requested() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        &format!(
            "{}{}",
            link("/login?next=/x", "Vendor Market"),
            link("/market", "Market")
        ),
    )
    .await;
    mount_page_expecting(&server, "/login", "<p>login</p>", 0).await;
    mount_page_expecting(&server, "/market", "<p>market</p>", 1).await;

    let report = Crawler::new(fast_gate()).crawl(&params(&server, &["leak"])).await;

    assert_eq!(report.pages_scanned, 1);
}

#[tokio::test]
async fn test_page_budget_is_respected() {
    let server = MockServer::start().await;
    let links: String = (1..=5)
        .map(|i| link(&format!("/vendor/{}", i), "Vendor"))
        .collect();
    mount_page(&server, "/", &links).await;
    for i in 1..=5 {
        mount_page(&server, &format!("/vendor/{}", i), "<p>vendor</p>").await;
    }

    let mut params = params(&server, &["leak"]);
    params.max_pages = 2;

    let report = Crawler::new(fast_gate()).crawl(&params).await;

    assert_eq!(report.pages_scanned, 2);
}

#[tokio::test]
async fn test_no_url_is_fetched_twice() {
    let server = MockServer::start().await;
    mount_page_expecting(
        &server,
        "/",
        &format!(
            "{}{}{}",
            link("/market/a", "Market A"),
            link("/market/b", "Market B"),
            link("/", "Market home")
        ),
        1,
    )
    .await;
    let shared = format!("{}{}", link("/dump/1", "Dump"), link("/", "Market home"));
    mount_page_expecting(&server, "/market/a", &shared, 1).await;
    mount_page_expecting(&server, "/market/b", &shared, 1).await;
    mount_page_expecting(&server, "/dump/1", "<p>dump</p>", 1).await;

    let report = Crawler::new(fast_gate()).crawl(&params(&server, &["leak"])).await;

    assert_eq!(report.pages_scanned, 3);
}

#[tokio::test]
async fn test_home_page_dump_is_reported() {
    let server = MockServer::start().await;
    let body = format!("<h1>Leak Database</h1><pre>{}</pre>", dump_lines(150));
    mount_page(&server, "/", &body).await;

    let report = Crawler::new(fast_gate())
        .crawl(&params(&server, &["leak", "password"]))
        .await;

    assert!(report.found);
    assert_eq!(report.pages_scanned, 0);
    assert_eq!(report.findings.len(), 1);

    let finding = &report.findings[0];
    assert_eq!(finding.url, format!("{}/", server.uri()));
    assert!(finding.leak_signals.contains(LeakSignal::DumpStructure));
    assert_eq!(finding.found_keywords, vec!["leak"]);
}

#[tokio::test]
async fn test_pages_without_signals_are_not_findings() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &link("/market", "Market")).await;
    mount_page(&server, "/market", "<p>leak talk but nothing sensitive</p>").await;

    let report = Crawler::new(fast_gate()).crawl(&params(&server, &["leak"])).await;

    assert_eq!(report.pages_scanned, 1);
    assert!(!report.found);
    assert!(report.findings.is_empty());
}

#[tokio::test]
async fn test_other_hosts_are_out_of_scope() {
    let server = MockServer::start().await;
    // same mock server under a different host name
    let offsite = server.uri().replace("127.0.0.1", "localhost");
    mount_page(
        &server,
        "/",
        &link(&format!("{}/offsite/market", offsite), "Market"),
    )
    .await;
    mount_page_expecting(&server, "/offsite/market", "<p>offsite</p>", 0).await;

    let mut params = params(&server, &["leak"]);
    params.include_subdomains = true;

    let report = Crawler::new(fast_gate()).crawl(&params).await;

    assert_eq!(report.pages_scanned, 0);
}

#[tokio::test]
async fn test_failed_inner_fetch_is_skipped() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        &format!("{}{}", link("/vendor/gone", "Vendor"), link("/vendor/ok", "Vendor")),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/vendor/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_page(&server, "/vendor/ok", "<p>fine</p>").await;

    let report = Crawler::new(fast_gate()).crawl(&params(&server, &["leak"])).await;

    assert!(report.unreachable.is_none());
    assert_eq!(report.pages_scanned, 1);
}

#[tokio::test]
async fn test_zero_time_limit_only_reads_home_page() {
    let server = MockServer::start().await;
    mount_page_expecting(&server, "/", &link("/vendor/1", "Vendor"), 1).await;
    mount_page_expecting(&server, "/vendor/1", "<p>vendor</p>", 0).await;

    let mut params = params(&server, &["leak"]);
    params.time_limit = Duration::ZERO;

    let report = Crawler::new(fast_gate()).crawl(&params).await;

    assert!(report.unreachable.is_none());
    assert_eq!(report.pages_scanned, 0);
}
