//! Leakwatch: a polite keyword and leak-indicator crawler
//!
//! This crate crawls seed sites through a shared politeness gate (robots.txt,
//! rate limiting, response caching), ranks discovered links with lexical
//! heuristics, and scores fetched pages for keyword hits and leak signals.
//! Scans run as pollable background jobs.

pub mod analysis;
pub mod config;
pub mod crawler;
pub mod gate;
pub mod output;
pub mod robots;
pub mod scan;
pub mod scoring;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Leakwatch operations
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid seed URL '{url}': {reason}")]
    InvalidSeedUrl { url: String, reason: String },

    #[error("No valid URLs to scan")]
    NoValidUrls,

    #[error("Scan not found: {0}")]
    JobNotFound(String),

    #[error("Crawl failed for {url}: {message}")]
    CrawlFailed { url: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScanError {
    /// Returns true if the error was caused by the caller's input
    /// rather than by the service itself
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NoValidUrls | Self::InvalidSeedUrl { .. } | Self::JobNotFound(_)
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlParams, CrawlReport, Crawler};
pub use gate::{FetchOutcome, NoContentReason, PolitenessGate};
pub use scan::{JobStatus, ScanJob, ScanRequest, ScanService};
