//! Scan jobs: submission, background execution, and status polling

mod job;
mod orchestrator;
mod request;

pub use job::{JobResults, JobStatus, KeywordMatch, Progress, ScanJob, SeedError, SeedStats};
pub use orchestrator::{ScanOptions, ScanService, SEED_PACING};
pub use request::{
    normalize_scan_urls, parse_keywords, validate_scan_url, CrawlBudget, ProfilePreset,
    ResolvedScan, ScanProfile, ScanRequest,
};
