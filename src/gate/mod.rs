//! Politeness gate mediating every outbound page fetch
//!
//! One gate is constructed per process and shared (behind an `Arc`) by every
//! crawl. It owns the response cache, the per-origin robots.txt policies and
//! the global rate limiter, so the requests-per-minute limit applies to the
//! total traffic of all concurrent scans.
//!
//! # Fetch Pipeline
//!
//! 1. Normalize the URL (strip the fragment)
//! 2. Serve from the response cache if younger than the TTL
//! 3. Check the origin's robots.txt policy (fetched lazily, then cached)
//! 4. Refuse low-value URLs without touching the network
//! 5. Wait for the rate limiter
//! 6. Pick a proxy, if any are configured
//! 7. GET with the configured timeout, following redirects
//!
//! The gate never fails: every problem is reported as
//! [`FetchOutcome::NoContent`] with a reason.

mod cache;
mod rate_limit;

pub use cache::{CacheEntry, ResponseCache};
pub use rate_limit::{min_interval, RateLimiter, MIN_REQUESTS_PER_MINUTE};

use crate::config::{Config, GateConfig, UserAgentConfig};
use crate::robots::{fetch_robots, RobotsCache};
use crate::scoring::is_low_value_url;
use crate::url::{normalize_url, origin_of};
use rand::Rng;
use reqwest::{redirect::Policy, Client, Proxy};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;
use url::Url;

/// Why a fetch produced no page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoContentReason {
    /// robots.txt disallows the URL for our user agent
    BlockedByRobots,
    /// URL matches the low-value token set
    LowValue,
    /// Network error, timeout, or non-2xx status
    Failed(String),
}

impl fmt::Display for NoContentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlockedByRobots => f.write_str("blocked_by_robots"),
            Self::LowValue => f.write_str("low_value"),
            Self::Failed(message) => f.write_str(message),
        }
    }
}

/// Result of a gated fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Page body
    Page(String),
    NoContent(NoContentReason),
}

impl FetchOutcome {
    pub fn into_page(self) -> Option<String> {
        match self {
            Self::Page(html) => Some(html),
            Self::NoContent(_) => None,
        }
    }
}

/// Tunables that can change while scans are running
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateSettings {
    pub requests_per_minute: f64,
    pub timeout: Duration,
}

/// Builds an HTTP client with proper configuration
///
/// The request timeout is applied per request so it can be reconfigured
/// without rebuilding clients.
pub fn build_http_client(user_agent: &str, proxy: Option<&str>) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true);

    if let Some(proxy_url) = proxy {
        builder = builder.proxy(Proxy::all(proxy_url)?);
    }

    builder.build()
}

/// Shared politeness gate
pub struct PolitenessGate {
    client: Client,
    proxy_clients: Vec<Client>,
    /// Product token matched against robots.txt groups
    robots_agent: String,
    settings: RwLock<GateSettings>,
    limiter: tokio::sync::Mutex<RateLimiter>,
    cache: Mutex<ResponseCache>,
    robots: Mutex<RobotsCache>,
    network_fetches: AtomicU64,
}

impl PolitenessGate {
    /// Creates a gate from the gate and user-agent configuration
    ///
    /// # Errors
    ///
    /// Fails if an HTTP client cannot be built, e.g. for a malformed proxy URL.
    pub fn new(gate: &GateConfig, user_agent: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        let header = user_agent.header_value();
        let client = build_http_client(&header, None)?;
        let proxy_clients = gate
            .proxies
            .iter()
            .map(|proxy| build_http_client(&header, Some(proxy)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            client,
            proxy_clients,
            robots_agent: user_agent.crawler_name.clone(),
            settings: RwLock::new(GateSettings {
                requests_per_minute: gate.requests_per_minute,
                timeout: Duration::from_secs(gate.timeout_seconds),
            }),
            limiter: tokio::sync::Mutex::new(RateLimiter::new(
                Duration::from_millis(gate.jitter_min_ms),
                Duration::from_millis(gate.jitter_max_ms),
            )),
            cache: Mutex::new(ResponseCache::new(Duration::from_secs(gate.cache_ttl_seconds))),
            robots: Mutex::new(RobotsCache::new()),
            network_fetches: AtomicU64::new(0),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(&config.gate, &config.user_agent)
    }

    /// Replaces the rate and timeout used by subsequent fetches
    pub fn reconfigure(&self, requests_per_minute: f64, timeout_seconds: u64) {
        let updated = GateSettings {
            requests_per_minute: requests_per_minute.max(MIN_REQUESTS_PER_MINUTE),
            timeout: Duration::from_secs(timeout_seconds.max(1)),
        };
        match self.settings.write() {
            Ok(mut settings) => *settings = updated,
            Err(poisoned) => *poisoned.into_inner() = updated,
        }
        tracing::info!(
            "Politeness gate reconfigured: {} req/min, {}s timeout",
            updated.requests_per_minute,
            updated.timeout.as_secs()
        );
    }

    pub fn settings(&self) -> GateSettings {
        match self.settings.read() {
            Ok(settings) => *settings,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Number of page requests that actually went out to the network
    pub fn network_fetch_count(&self) -> u64 {
        self.network_fetches.load(Ordering::SeqCst)
    }

    /// Fetches a page through the full politeness pipeline
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let url = match normalize_url(url) {
            Ok(url) => url,
            Err(e) => return FetchOutcome::NoContent(NoContentReason::Failed(e.to_string())),
        };
        let key = url.to_string();

        if let Some(html) = self.cached(&key) {
            tracing::debug!("Cache hit: {}", key);
            return FetchOutcome::Page(html);
        }

        let settings = self.settings();

        if !self.robots_allowed(&url, settings.timeout).await {
            tracing::debug!("Blocked by robots.txt: {}", key);
            return FetchOutcome::NoContent(NoContentReason::BlockedByRobots);
        }

        if is_low_value_url(&key) {
            tracing::debug!("Skipping low-value URL: {}", key);
            return FetchOutcome::NoContent(NoContentReason::LowValue);
        }

        {
            let mut limiter = self.limiter.lock().await;
            limiter.wait(min_interval(settings.requests_per_minute)).await;
        }

        let client = self.pick_client();
        self.network_fetches.fetch_add(1, Ordering::SeqCst);

        let response = match client.get(url.clone()).timeout(settings.timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Fetch failed for {}: {}", key, e);
                return FetchOutcome::NoContent(NoContentReason::Failed(e.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Fetch failed for {}: HTTP {}", key, status);
            return FetchOutcome::NoContent(NoContentReason::Failed(format!(
                "HTTP {}",
                status.as_u16()
            )));
        }

        match response.text().await {
            Ok(body) => {
                self.store(key, body.clone());
                FetchOutcome::Page(body)
            }
            Err(e) => {
                tracing::warn!("Failed to read body of {}: {}", key, e);
                FetchOutcome::NoContent(NoContentReason::Failed(e.to_string()))
            }
        }
    }

    fn cached(&self, key: &str) -> Option<String> {
        let cache = match self.cache.lock() {
            Ok(cache) => cache,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache.get(key).map(str::to_string)
    }

    fn store(&self, key: String, html: String) {
        let mut cache = match self.cache.lock() {
            Ok(cache) => cache,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache.insert(key, html);
    }

    /// Looks up (fetching on first use) the origin's robots.txt policy
    ///
    /// The cache lock is never held while robots.txt downloads, so a slow
    /// origin only delays fetches to that origin.
    async fn robots_allowed(&self, url: &Url, timeout: Duration) -> bool {
        let origin = origin_of(url);

        if let Some(allowed) = self.with_robots(|robots| {
            robots
                .get(&origin)
                .map(|policy| policy.is_allowed(url.as_str(), &self.robots_agent))
        }) {
            return allowed;
        }

        let policy = fetch_robots(&self.client, &origin, timeout).await;

        // a policy stored by another task in the meantime wins
        self.with_robots(|robots| {
            robots
                .get_or_insert(origin, policy)
                .is_allowed(url.as_str(), &self.robots_agent)
        })
    }

    fn with_robots<T>(&self, f: impl FnOnce(&mut RobotsCache) -> T) -> T {
        let mut robots = match self.robots.lock() {
            Ok(robots) => robots,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut robots)
    }

    fn pick_client(&self) -> &Client {
        if self.proxy_clients.is_empty() {
            return &self.client;
        }
        let index = rand::rng().random_range(0..self.proxy_clients.len());
        &self.proxy_clients[index]
    }
}

impl fmt::Debug for PolitenessGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolitenessGate")
            .field("robots_agent", &self.robots_agent)
            .field("proxies", &self.proxy_clients.len())
            .field("settings", &self.settings())
            .field("network_fetches", &self.network_fetch_count())
            .finish()
    }
}
