//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! Robots.txt that cannot be fetched or parsed never blocks a crawl: it is
//! treated as "no restrictions".

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::ParsedRobots;

use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Fetches and parses `/robots.txt` for a site origin
///
/// | Response              | Policy        |
/// |-----------------------|---------------|
/// | 2xx                   | parsed body   |
/// | 401 / 403             | disallow all  |
/// | other status, network error, unreadable body | allow all |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `origin` - The site origin, e.g. `https://example.com`
/// * `timeout` - Request timeout
pub async fn fetch_robots(client: &Client, origin: &str, timeout: Duration) -> ParsedRobots {
    let robots_url = format!("{}/robots.txt", origin.trim_end_matches('/'));

    let response = match client.get(&robots_url).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("robots.txt unreachable at {}: {}", robots_url, e);
            return ParsedRobots::allow_all();
        }
    };

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        tracing::debug!("robots.txt at {} returned {}, disallowing", robots_url, status);
        return ParsedRobots::disallow_all();
    }

    if !status.is_success() {
        tracing::debug!("robots.txt at {} returned {}, allowing", robots_url, status);
        return ParsedRobots::allow_all();
    }

    match response.text().await {
        Ok(body) => ParsedRobots::from_content(&body),
        Err(e) => {
            tracing::debug!("robots.txt body unreadable at {}: {}", robots_url, e);
            ParsedRobots::allow_all()
        }
    }
}
