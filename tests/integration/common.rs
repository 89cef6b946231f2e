//! Shared fixtures for integration tests

use leakwatch::config::{GateConfig, UserAgentConfig};
use leakwatch::PolitenessGate;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

/// Gate settings that keep tests fast: high rate, no jitter
pub fn fast_gate_config() -> GateConfig {
    GateConfig {
        requests_per_minute: 6000.0,
        timeout_seconds: 5,
        cache_ttl_seconds: 86_400,
        jitter_min_ms: 0,
        jitter_max_ms: 0,
        proxies: Vec::new(),
    }
}

pub fn gate_with(config: GateConfig) -> Arc<PolitenessGate> {
    Arc::new(PolitenessGate::new(&config, &user_agent()).expect("Failed to build gate"))
}

pub fn fast_gate() -> Arc<PolitenessGate> {
    gate_with(fast_gate_config())
}

pub fn html(body: &str) -> String {
    format!("<html><head><title>Test</title></head><body>{}</body></html>", body)
}

/// Serves `body` as HTML at `page_path`
pub async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html(body))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Serves `body` at `page_path` and fails verification unless it is
/// requested exactly `times` times
pub async fn mount_page_expecting(server: &MockServer, page_path: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html(body))
                .insert_header("content-type", "text/html"),
        )
        .expect(times)
        .mount(server)
        .await;
}

/// A block of text long enough to look like a dump
pub fn dump_lines(count: usize) -> String {
    (0..count).map(|i| format!("record {}\n", i)).collect()
}
