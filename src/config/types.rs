use serde::Deserialize;

/// Main configuration structure for Leakwatch
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, rename = "seed")]
    pub seeds: Vec<SeedEntry>,
}

/// Politeness gate configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    /// Total outbound requests allowed per minute across all scans
    #[serde(rename = "requests-per-minute", default = "default_requests_per_minute")]
    pub requests_per_minute: f64,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-seconds", default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// How long a fetched page stays in the response cache (seconds)
    #[serde(rename = "cache-ttl-seconds", default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,

    /// Lower bound of the random delay added to a rate-limit wait (milliseconds)
    #[serde(rename = "jitter-min-ms", default = "default_jitter_min_ms")]
    pub jitter_min_ms: u64,

    /// Upper bound (exclusive) of the rate-limit jitter (milliseconds)
    #[serde(rename = "jitter-max-ms", default = "default_jitter_max_ms")]
    pub jitter_max_ms: u64,

    /// Proxy URLs; one is picked at random for each fetch
    #[serde(default)]
    pub proxies: Vec<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: default_requests_per_minute(),
            timeout_seconds: default_timeout_seconds(),
            cache_ttl_seconds: default_cache_ttl_seconds(),
            jitter_min_ms: default_jitter_min_ms(),
            jitter_max_ms: default_jitter_max_ms(),
            proxies: Vec::new(),
        }
    }
}

fn default_requests_per_minute() -> f64 {
    3.0
}

fn default_timeout_seconds() -> u64 {
    12
}

fn default_cache_ttl_seconds() -> u64 {
    86_400
}

fn default_jitter_min_ms() -> u64 {
    300
}

fn default_jitter_max_ms() -> u64 {
    1_200
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler, also used as the robots.txt product token
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database holding seeds and scan settings
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Result export configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Where to write the markdown summary of a finished scan
    #[serde(rename = "summary-path")]
    pub summary_path: Option<String>,

    /// Where to write the JSON export of a finished scan
    #[serde(rename = "json-path")]
    pub json_path: Option<String>,
}

/// Seed registered on first start when the seed store is empty
#[derive(Debug, Clone, Deserialize)]
pub struct SeedEntry {
    pub url: String,
    pub name: String,
}
