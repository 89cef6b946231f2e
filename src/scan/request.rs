//! Scan submissions and their resolution into crawl parameters

use crate::crawler::CrawlParams;
use crate::storage::{ScanSettings, Setting};
use crate::url::validate_seed_url;
use crate::ScanError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Preset budgets a request can start from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanProfile {
    Efficiency,
    Balanced,
    Accuracy,
}

/// Values a profile fills in for overrides left absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfilePreset {
    pub max_pages: i64,
    pub max_depth: i64,
    pub time_limit_seconds: i64,
    pub min_priority_to_expand: i64,
}

impl ScanProfile {
    pub fn preset(&self) -> ProfilePreset {
        match self {
            Self::Efficiency => ProfilePreset {
                max_pages: 1,
                max_depth: 0,
                time_limit_seconds: 5,
                min_priority_to_expand: 6,
            },
            Self::Balanced => ProfilePreset {
                max_pages: 2,
                max_depth: 1,
                time_limit_seconds: 15,
                min_priority_to_expand: 3,
            },
            Self::Accuracy => ProfilePreset {
                max_pages: 4,
                max_depth: 2,
                time_limit_seconds: 50,
                min_priority_to_expand: 0,
            },
        }
    }
}

impl FromStr for ScanProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "efficiency" => Ok(Self::Efficiency),
            "balanced" => Ok(Self::Balanced),
            "accuracy" => Ok(Self::Accuracy),
            other => Err(format!(
                "unknown profile '{}', expected efficiency, balanced or accuracy",
                other
            )),
        }
    }
}

impl fmt::Display for ScanProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Efficiency => f.write_str("efficiency"),
            Self::Balanced => f.write_str("balanced"),
            Self::Accuracy => f.write_str("accuracy"),
        }
    }
}

/// A scan submission
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanRequest {
    /// Comma-separated keyword list
    pub keywords: String,
    /// Explicit URLs; empty means "use the enabled seeds"
    pub urls: Vec<String>,
    pub max_pages: Option<i64>,
    pub max_depth: Option<i64>,
    pub time_limit_seconds: Option<i64>,
    pub min_priority_to_expand: Option<i64>,
    pub include_subdomains: Option<bool>,
    pub profile: Option<ScanProfile>,
}

impl ScanRequest {
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            ..Self::default()
        }
    }

    pub fn with_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.urls = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Requested value for a tunable, falling back to the profile preset
    fn requested(&self, setting: Setting) -> Option<i64> {
        let explicit = match setting {
            Setting::MaxPages => self.max_pages,
            Setting::MaxDepth => self.max_depth,
            Setting::TimeLimitSeconds => self.time_limit_seconds,
            Setting::MinPriorityToExpand => self.min_priority_to_expand,
            Setting::RequestsPerMinute | Setting::RequestTimeoutSeconds => None,
        };

        explicit.or_else(|| {
            let preset = self.profile?.preset();
            match setting {
                Setting::MaxPages => Some(preset.max_pages),
                Setting::MaxDepth => Some(preset.max_depth),
                Setting::TimeLimitSeconds => Some(preset.time_limit_seconds),
                Setting::MinPriorityToExpand => Some(preset.min_priority_to_expand),
                Setting::RequestsPerMinute | Setting::RequestTimeoutSeconds => None,
            }
        })
    }
}

/// Effective per-seed budget for a submitted scan
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlBudget {
    pub max_pages: u32,
    pub max_depth: u32,
    pub time_limit: Duration,
    pub min_priority_to_expand: i32,
    pub include_subdomains: bool,
}

impl CrawlBudget {
    /// Clamps the request's overrides into the stored ranges
    pub fn resolve(request: &ScanRequest, settings: &ScanSettings) -> Self {
        let value = |setting: Setting| settings.resolve(setting, request.requested(setting));

        Self {
            max_pages: to_u32(value(Setting::MaxPages)),
            max_depth: to_u32(value(Setting::MaxDepth)),
            time_limit: Duration::from_secs(value(Setting::TimeLimitSeconds).max(0) as u64),
            min_priority_to_expand: i32::try_from(value(Setting::MinPriorityToExpand))
                .unwrap_or(i32::MAX),
            include_subdomains: settings.resolve_include_subdomains(request.include_subdomains),
        }
    }
}

fn to_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// A submission resolved against stored settings and seeds
#[derive(Debug, Clone)]
pub struct ResolvedScan {
    pub keywords: Vec<String>,
    pub urls: Vec<Url>,
    pub budget: CrawlBudget,
}

impl ResolvedScan {
    pub fn crawl_params(&self, start_url: &Url) -> CrawlParams {
        CrawlParams {
            start_url: start_url.clone(),
            keywords: self.keywords.clone(),
            max_pages: self.budget.max_pages,
            min_priority_to_expand: self.budget.min_priority_to_expand,
            include_subdomains: self.budget.include_subdomains,
            time_limit: self.budget.time_limit,
            max_depth: self.budget.max_depth,
        }
    }
}

/// Splits a comma-separated keyword string, dropping empty entries
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validates one scan URL: http or https with a host, fragment stripped
pub fn validate_scan_url(candidate: &str) -> Result<Url, ScanError> {
    validate_seed_url(candidate).map_err(|e| ScanError::InvalidSeedUrl {
        url: candidate.trim().to_string(),
        reason: e.to_string(),
    })
}

/// Validates candidate URLs, dropping invalid ones with a warning
pub fn normalize_scan_urls<S: AsRef<str>>(candidates: &[S]) -> Vec<Url> {
    let mut urls = Vec::new();

    for candidate in candidates {
        let candidate = candidate.as_ref().trim();
        if candidate.is_empty() {
            continue;
        }
        match validate_scan_url(candidate) {
            Ok(url) => urls.push(url),
            Err(e) => tracing::warn!("Skipping scan URL: {}", e),
        }
    }

    urls
}
