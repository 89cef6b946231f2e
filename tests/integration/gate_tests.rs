//! Politeness gate tests against a mock server

use crate::common::{fast_gate, fast_gate_config, gate_with, mount_page, mount_page_expecting};
use leakwatch::{FetchOutcome, NoContentReason};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_robots(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_returns_page_body() {
    let server = MockServer::start().await;
    mount_page(&server, "/news", "<p>Hello</p>").await;

    let gate = fast_gate();
    let outcome = gate.fetch(&format!("{}/news", server.uri())).await;

    let html = outcome.into_page().expect("page expected");
    assert!(html.contains("<p>Hello</p>"));
    assert_eq!(gate.network_fetch_count(), 1);
}

#[tokio::test]
async fn test_second_fetch_is_served_from_cache() {
    let server = MockServer::start().await;
    mount_page_expecting(&server, "/news", "<p>Cached</p>", 1).await;

    let gate = fast_gate();
    let url = format!("{}/news", server.uri());

    let first = gate.fetch(&url).await;
    let second = gate.fetch(&url).await;

    assert_eq!(first, second);
    assert_eq!(gate.network_fetch_count(), 1);
}

#[tokio::test]
async fn test_cache_key_ignores_fragment() {
    let server = MockServer::start().await;
    mount_page_expecting(&server, "/news", "<p>Once</p>", 1).await;

    let gate = fast_gate();
    gate.fetch(&format!("{}/news", server.uri())).await;
    let outcome = gate.fetch(&format!("{}/news#comments", server.uri())).await;

    assert!(matches!(outcome, FetchOutcome::Page(_)));
    assert_eq!(gate.network_fetch_count(), 1);
}

#[tokio::test]
async fn test_robots_disallow_blocks_without_fetching() {
    let server = MockServer::start().await;
    mount_robots(&server, 200, "User-agent: *\nDisallow: /private\n").await;
    mount_page_expecting(&server, "/private/area", "<p>secret</p>", 0).await;
    mount_page(&server, "/public", "<p>open</p>").await;

    let gate = fast_gate();

    let blocked = gate.fetch(&format!("{}/private/area", server.uri())).await;
    assert_eq!(
        blocked,
        FetchOutcome::NoContent(NoContentReason::BlockedByRobots)
    );

    let allowed = gate.fetch(&format!("{}/public", server.uri())).await;
    assert!(matches!(allowed, FetchOutcome::Page(_)));
    assert_eq!(gate.network_fetch_count(), 1);
}

#[tokio::test]
async fn test_robots_fetched_once_per_origin() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /\n"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/a", "<p>a</p>").await;
    mount_page(&server, "/b", "<p>b</p>").await;

    let gate = fast_gate();
    gate.fetch(&format!("{}/a", server.uri())).await;
    gate.fetch(&format!("{}/b", server.uri())).await;

    assert_eq!(gate.network_fetch_count(), 2);
}

#[tokio::test]
async fn test_robots_agent_specific_group() {
    let server = MockServer::start().await;
    mount_robots(
        &server,
        200,
        "User-agent: TestBot\nDisallow: /\n\nUser-agent: *\nAllow: /\n",
    )
    .await;
    mount_page_expecting(&server, "/news", "<p>news</p>", 0).await;

    let gate = fast_gate();
    let outcome = gate.fetch(&format!("{}/news", server.uri())).await;

    assert_eq!(
        outcome,
        FetchOutcome::NoContent(NoContentReason::BlockedByRobots)
    );
}

#[tokio::test]
async fn test_robots_forbidden_disallows_everything() {
    let server = MockServer::start().await;
    mount_robots(&server, 403, "").await;
    mount_page_expecting(&server, "/news", "<p>news</p>", 0).await;

    let gate = fast_gate();
    let outcome = gate.fetch(&format!("{}/news", server.uri())).await;

    assert_eq!(
        outcome,
        FetchOutcome::NoContent(NoContentReason::BlockedByRobots)
    );
}

#[tokio::test]
async fn test_missing_robots_allows_everything() {
    let server = MockServer::start().await;
    mount_robots(&server, 404, "").await;
    mount_page(&server, "/news", "<p>news</p>").await;

    let gate = fast_gate();
    let outcome = gate.fetch(&format!("{}/news", server.uri())).await;

    assert!(matches!(outcome, FetchOutcome::Page(_)));
}

#[tokio::test]
async fn test_low_value_url_is_never_requested() {
    let server = MockServer::start().await;
    mount_page_expecting(&server, "/login", "<p>login</p>", 0).await;

    let gate = fast_gate();
    let outcome = gate.fetch(&format!("{}/login?next=/x", server.uri())).await;

    assert_eq!(outcome, FetchOutcome::NoContent(NoContentReason::LowValue));
    assert_eq!(gate.network_fetch_count(), 0);
}

#[tokio::test]
async fn test_server_error_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let gate = fast_gate();
    let outcome = gate.fetch(&format!("{}/broken", server.uri())).await;

    assert_eq!(
        outcome,
        FetchOutcome::NoContent(NoContentReason::Failed("HTTP 500".to_string()))
    );
}

#[tokio::test]
async fn test_failed_fetch_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let gate = fast_gate();
    let url = format!("{}/flaky", server.uri());
    gate.fetch(&url).await;
    gate.fetch(&url).await;

    assert_eq!(gate.network_fetch_count(), 2);
}

#[tokio::test]
async fn test_redirects_are_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/new", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/new", "<p>moved</p>").await;

    let gate = fast_gate();
    let outcome = gate.fetch(&format!("{}/old", server.uri())).await;

    let html = outcome.into_page().expect("redirect target expected");
    assert!(html.contains("moved"));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let mut config = fast_gate_config();
    config.timeout_seconds = 1;
    let gate = gate_with(config);

    let outcome = gate.fetch(&format!("{}/slow", server.uri())).await;
    assert!(matches!(
        outcome,
        FetchOutcome::NoContent(NoContentReason::Failed(_))
    ));
}

#[tokio::test]
async fn test_fetches_are_spaced_by_rate_limit() {
    let server = MockServer::start().await;
    mount_page(&server, "/a", "<p>a</p>").await;
    mount_page(&server, "/b", "<p>b</p>").await;

    let mut config = fast_gate_config();
    // 100 ms between requests
    config.requests_per_minute = 600.0;
    let gate = gate_with(config);

    let start = Instant::now();
    gate.fetch(&format!("{}/a", server.uri())).await;
    gate.fetch(&format!("{}/b", server.uri())).await;

    assert!(start.elapsed() >= Duration::from_millis(95));
}

#[tokio::test]
async fn test_rate_limit_is_shared_across_tasks() {
    let server = MockServer::start().await;
    for page in ["/a", "/b", "/c", "/d"] {
        mount_page(&server, page, "<p>x</p>").await;
    }

    let mut config = fast_gate_config();
    config.requests_per_minute = 600.0;
    let gate = gate_with(config);

    let start = Instant::now();
    let mut handles = Vec::new();
    for page in ["/a", "/b", "/c", "/d"] {
        let gate = Arc::clone(&gate);
        let url = format!("{}{}", server.uri(), page);
        handles.push(tokio::spawn(async move { gate.fetch(&url).await }));
    }
    for handle in handles {
        assert!(matches!(handle.await.unwrap(), FetchOutcome::Page(_)));
    }

    // four fetches need at least three full intervals
    assert!(start.elapsed() >= Duration::from_millis(290));
    assert_eq!(gate.network_fetch_count(), 4);
}

#[tokio::test]
async fn test_reconfigure_changes_pacing() {
    let server = MockServer::start().await;
    mount_page(&server, "/a", "<p>a</p>").await;
    mount_page(&server, "/b", "<p>b</p>").await;

    let gate = fast_gate();
    gate.reconfigure(300.0, 5);
    assert_eq!(gate.settings().timeout, Duration::from_secs(5));

    let start = Instant::now();
    gate.fetch(&format!("{}/a", server.uri())).await;
    gate.fetch(&format!("{}/b", server.uri())).await;

    assert!(start.elapsed() >= Duration::from_millis(195));
}

#[tokio::test]
async fn test_slow_robots_does_not_block_other_origins() {
    let slow = MockServer::start().await;
    let fast = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("User-agent: *\nAllow: /\n")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&slow)
        .await;
    mount_page(&slow, "/x", "<p>slow</p>").await;
    mount_robots(&fast, 200, "User-agent: *\nAllow: /\n").await;
    mount_page(&fast, "/x", "<p>x</p>").await;
    mount_page(&fast, "/y", "<p>y</p>").await;

    let gate = fast_gate();
    // caches the fast origin's policy
    gate.fetch(&format!("{}/x", fast.uri())).await;

    let pending = {
        let gate = Arc::clone(&gate);
        let url = format!("{}/x", slow.uri());
        tokio::spawn(async move { gate.fetch(&url).await })
    };
    tokio::time::sleep(Duration::from_millis(200)).await;

    let start = Instant::now();
    let outcome = gate.fetch(&format!("{}/y", fast.uri())).await;

    assert!(matches!(outcome, FetchOutcome::Page(_)));
    assert!(start.elapsed() < Duration::from_millis(1000));

    assert!(matches!(pending.await.unwrap(), FetchOutcome::Page(_)));
}

#[tokio::test]
async fn test_fetch_goes_through_configured_proxy() {
    let proxy = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<p>via proxy</p>")
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&proxy)
        .await;

    let mut config = fast_gate_config();
    config.timeout_seconds = 2;
    config.proxies = vec![proxy.uri()];
    let gate = gate_with(config);

    // the host does not resolve, so only the proxy can answer
    let outcome = gate.fetch("http://unresolvable-host.invalid/market").await;

    let html = outcome.into_page().expect("page served by the proxy");
    assert!(html.contains("via proxy"));
    assert_eq!(gate.network_fetch_count(), 1);
}
