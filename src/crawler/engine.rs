//! Crawl engine - budgeted priority traversal of one site
//!
//! The engine fetches the site home page, then walks discovered links in
//! score order until the frontier empties or the page or time budget runs
//! out. Every fetch goes through the shared [`PolitenessGate`].

use crate::analysis::{analyze_document, extract_links_from, DiscoveredLink, PageFinding};
use crate::crawler::frontier::Frontier;
use crate::gate::{FetchOutcome, PolitenessGate};
use crate::scoring::{classify_link, is_low_value_url, score_link, LinkCategory};
use crate::url::{extract_domain, home_url, in_crawl_scope, normalize_url, origin_of};
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Score at which a branch earns one extra hop of depth
pub const HIGH_SCORE_THRESHOLD: i32 = 5;

/// Expansion depth ceiling for ordinary branches
pub const BASE_DEPTH_CEILING: u32 = 2;

/// Expansion depth ceiling for high-scoring branches
pub const HIGH_SCORE_DEPTH_CEILING: u32 = 3;

/// Per-invocation crawl parameters
#[derive(Debug, Clone)]
pub struct CrawlParams {
    pub start_url: Url,
    pub keywords: Vec<String>,
    pub max_pages: u32,
    pub min_priority_to_expand: i32,
    pub include_subdomains: bool,
    pub time_limit: Duration,
    /// Accepted and reported, but not consulted by the expansion rule
    pub max_depth: u32,
}

/// Outcome of crawling one seed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlReport {
    pub site_origin: String,
    /// True if any finding carries leak signals
    pub found: bool,
    /// Pages with leak signals, in discovery order
    pub findings: Vec<PageFinding>,
    pub pages_scanned: u32,
    pub max_depth_reached: u32,
    pub elapsed_seconds: f64,
    /// Why the home page could not be fetched, if it could not
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unreachable: Option<String>,
}

impl CrawlReport {
    fn unreachable(site_origin: String, reason: String, elapsed: Duration) -> Self {
        Self {
            site_origin,
            found: false,
            findings: Vec::new(),
            pages_scanned: 0,
            max_depth_reached: 0,
            elapsed_seconds: elapsed.as_secs_f64(),
            unreachable: Some(reason),
        }
    }
}

/// Whether a page at `depth` reached with `score` may push children at depth + 1
pub fn may_descend(depth: u32, score: i32) -> bool {
    let ceiling = if score >= HIGH_SCORE_THRESHOLD {
        HIGH_SCORE_DEPTH_CEILING
    } else {
        BASE_DEPTH_CEILING
    };
    depth < ceiling
}

/// Whether a fetched page is worth expanding at all
pub fn should_expand(score: i32, min_priority_to_expand: i32, has_leak_signals: bool) -> bool {
    score >= min_priority_to_expand || has_leak_signals
}

/// Runs crawls against a shared politeness gate
#[derive(Debug, Clone)]
pub struct Crawler {
    gate: Arc<PolitenessGate>,
}

impl Crawler {
    pub fn new(gate: Arc<PolitenessGate>) -> Self {
        Self { gate }
    }

    pub fn gate(&self) -> &Arc<PolitenessGate> {
        &self.gate
    }

    pub async fn crawl(&self, params: &CrawlParams) -> CrawlReport {
        crawl(&self.gate, params).await
    }
}

/// Crawls one site starting from its home page
///
/// Never fails: an unreachable home page yields an empty report with
/// [`CrawlReport::unreachable`] set, and failed inner fetches are skipped.
pub async fn crawl(gate: &PolitenessGate, params: &CrawlParams) -> CrawlReport {
    let started = Instant::now();
    let home = home_url(&params.start_url);
    let site_origin = origin_of(&home);
    let site_host = extract_domain(&home).unwrap_or_default();

    tracing::info!("Crawling {} (max {} pages)", site_origin, params.max_pages);

    let home_html = match gate.fetch(home.as_str()).await {
        FetchOutcome::Page(html) => html,
        FetchOutcome::NoContent(reason) => {
            tracing::warn!("Home page unreachable for {}: {}", site_origin, reason);
            return CrawlReport::unreachable(site_origin, reason.to_string(), started.elapsed());
        }
    };

    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(home.to_string());

    let mut findings = Vec::new();
    let mut frontier = Frontier::new();

    let (home_finding, home_links) = analyze_html(
        home.as_str(),
        &home_html,
        &params.keywords,
        classify_link(home.as_str(), ""),
        &home,
    );
    if home_finding.has_leak_signals() {
        findings.push(home_finding);
    }
    enqueue_links(&mut frontier, home_links, 1, &site_host, params.include_subdomains);

    let mut pages_scanned: u32 = 0;
    let mut max_depth_reached: u32 = 0;

    while pages_scanned < params.max_pages && started.elapsed() < params.time_limit {
        let Some(entry) = frontier.pop() else {
            break;
        };

        if !visited.insert(entry.url.to_string()) {
            continue;
        }

        let html = match gate.fetch(entry.url.as_str()).await {
            FetchOutcome::Page(html) => html,
            FetchOutcome::NoContent(reason) => {
                tracing::debug!("Skipping {}: {}", entry.url, reason);
                continue;
            }
        };

        let category = classify_link(entry.url.as_str(), &entry.anchor_text);
        let (finding, links) = analyze_html(
            entry.url.as_str(),
            &html,
            &params.keywords,
            category,
            &entry.url,
        );
        let has_signals = finding.has_leak_signals();
        if has_signals {
            findings.push(finding);
        }

        pages_scanned += 1;
        max_depth_reached = max_depth_reached.max(entry.depth);

        if !should_expand(entry.score, params.min_priority_to_expand, has_signals) {
            continue;
        }
        if !may_descend(entry.depth, entry.score) {
            continue;
        }

        enqueue_links(
            &mut frontier,
            links,
            entry.depth + 1,
            &site_host,
            params.include_subdomains,
        );
    }

    let elapsed = started.elapsed();
    let found = findings.iter().any(PageFinding::has_leak_signals);

    tracing::info!(
        "Crawl of {} finished: {} pages, {} findings, {:.1}s",
        site_origin,
        pages_scanned,
        findings.len(),
        elapsed.as_secs_f64()
    );

    CrawlReport {
        site_origin,
        found,
        findings,
        pages_scanned,
        max_depth_reached,
        elapsed_seconds: elapsed.as_secs_f64(),
        unreachable: None,
    }
}

/// Parses a page once for both analysis and link extraction
///
/// Kept synchronous so the non-`Send` document never lives across an await.
fn analyze_html(
    url: &str,
    html: &str,
    keywords: &[String],
    category: LinkCategory,
    base_url: &Url,
) -> (PageFinding, Vec<DiscoveredLink>) {
    let document = Html::parse_document(html);
    let finding = analyze_document(url, &document, keywords, category);
    let links = extract_links_from(&document, base_url);
    (finding, links)
}

/// Scores discovered links and pushes the in-scope, positive ones
fn enqueue_links(
    frontier: &mut Frontier,
    links: Vec<DiscoveredLink>,
    depth: u32,
    site_host: &str,
    include_subdomains: bool,
) {
    for link in links {
        let Ok(url) = normalize_url(link.url.as_str()) else {
            continue;
        };

        let in_scope = url
            .host_str()
            .map(|host| in_crawl_scope(site_host, host, include_subdomains))
            .unwrap_or(false);
        if !in_scope || is_low_value_url(url.as_str()) {
            continue;
        }

        let score = score_link(url.as_str(), &link.anchor_text);
        if frontier.push(url, link.anchor_text, score, depth) {
            tracing::debug!("Queued (score {}, depth {})", score, depth);
        }
    }
}
