//! Scan job records as seen by pollers

use crate::crawler::CrawlReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a job; `Complete` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Scanning,
    Complete,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scanning => f.write_str("scanning"),
            Self::Complete => f.write_str("complete"),
        }
    }
}

/// Which seed the worker is on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    pub current_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMatch {
    pub keyword: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedError {
    pub url: String,
    pub error: String,
}

/// Per-seed crawl statistics; every seed gets exactly one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedStats {
    pub url: String,
    pub pages_scanned: u32,
    pub max_depth_reached: u32,
    pub elapsed_seconds: f64,
}

impl SeedStats {
    /// Stats for a seed whose crawl did not produce a report
    pub fn placeholder(url: &str) -> Self {
        Self {
            url: url.to_string(),
            pages_scanned: 0,
            max_depth_reached: 0,
            elapsed_seconds: 0.0,
        }
    }
}

/// Results accumulated by a worker while it walks its seeds
#[derive(Debug, Clone, Default)]
pub struct JobResults {
    pub matches: Vec<KeywordMatch>,
    pub errors: Vec<SeedError>,
    pub stats: Vec<SeedStats>,
}

impl JobResults {
    /// Folds one seed's crawl report in
    ///
    /// An unreachable home page becomes an error record; its stats are still
    /// recorded.
    pub fn record_report(&mut self, seed_url: &str, report: &CrawlReport) {
        if let Some(reason) = &report.unreachable {
            self.errors.push(SeedError {
                url: seed_url.to_string(),
                error: reason.clone(),
            });
        }

        for finding in &report.findings {
            for keyword in &finding.found_keywords {
                self.matches.push(KeywordMatch {
                    keyword: keyword.clone(),
                    url: finding.url.clone(),
                });
            }
        }

        self.stats.push(SeedStats {
            url: seed_url.to_string(),
            pages_scanned: report.pages_scanned,
            max_depth_reached: report.max_depth_reached,
            elapsed_seconds: report.elapsed_seconds,
        });
    }

    /// Records a seed whose crawl failed outright
    pub fn record_failure(&mut self, seed_url: &str, error: String) {
        self.errors.push(SeedError {
            url: seed_url.to_string(),
            error,
        });
        self.stats.push(SeedStats::placeholder(seed_url));
    }
}

/// One asynchronous scan across one or more seeds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanJob {
    pub id: String,
    pub status: JobStatus,
    pub progress: Progress,
    pub matches: Vec<KeywordMatch>,
    pub errors: Vec<SeedError>,
    pub stats: Vec<SeedStats>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ScanJob {
    pub fn new(id: String, total: usize) -> Self {
        Self {
            id,
            status: JobStatus::Scanning,
            progress: Progress {
                current: 0,
                total,
                current_url: None,
            },
            matches: Vec::new(),
            errors: Vec::new(),
            stats: Vec::new(),
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Marks seed `current` (1-based) as in flight
    pub fn begin_seed(&mut self, current: usize, url: &str) {
        if self.status == JobStatus::Complete {
            return;
        }
        self.progress.current = self.progress.current.max(current);
        self.progress.current_url = Some(url.to_string());
    }

    /// Attaches the accumulated results and closes the job
    pub fn complete(&mut self, results: JobResults) {
        if self.status == JobStatus::Complete {
            return;
        }
        self.matches = results.matches;
        self.errors = results.errors;
        self.stats = results.stats;
        self.status = JobStatus::Complete;
        self.completed_at = Some(Utc::now());
    }

    pub fn is_complete(&self) -> bool {
        self.status == JobStatus::Complete
    }
}
