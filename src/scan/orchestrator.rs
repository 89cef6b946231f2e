//! Scan job orchestrator
//!
//! Each submission becomes a detached background worker that crawls its
//! seeds one after another and folds the reports into the job record. The
//! job table is guarded by a single mutex so every status read returns a
//! consistent snapshot.

use crate::crawler::{CrawlParams, CrawlReport, Crawler};
use crate::gate::PolitenessGate;
use crate::scan::job::{JobResults, ScanJob};
use crate::scan::request::{normalize_scan_urls, parse_keywords, CrawlBudget, ResolvedScan};
use crate::scan::ScanRequest;
use crate::storage::{
    ScanSettings, SeedStore, Setting, SettingRange, SettingsStore, SqliteStorage,
};
use crate::ScanError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Pause between two seeds of one job
pub const SEED_PACING: Duration = Duration::from_millis(100);

type JobTable = Arc<Mutex<HashMap<String, ScanJob>>>;

/// Worker tunables
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub seed_pacing: Duration,
    /// Hard limit on one seed's crawl, on top of its own time budget
    pub seed_deadline: Option<Duration>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            seed_pacing: SEED_PACING,
            seed_deadline: None,
        }
    }
}

/// Submits scans and answers status polls
#[derive(Clone)]
pub struct ScanService {
    crawler: Crawler,
    storage: Arc<Mutex<SqliteStorage>>,
    jobs: JobTable,
    options: ScanOptions,
}

impl ScanService {
    pub fn new(gate: Arc<PolitenessGate>, storage: Arc<Mutex<SqliteStorage>>) -> Self {
        Self {
            crawler: Crawler::new(gate),
            storage,
            jobs: Arc::new(Mutex::new(HashMap::new())),
            options: ScanOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn gate(&self) -> &Arc<PolitenessGate> {
        self.crawler.gate()
    }

    fn storage(&self) -> MutexGuard<'_, SqliteStorage> {
        match self.storage.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Current stored scan settings
    pub fn settings(&self) -> Result<ScanSettings, ScanError> {
        Ok(self.storage().load_settings()?)
    }

    /// Pushes the stored rate and timeout defaults into the politeness gate
    pub fn apply_settings(&self) -> Result<ScanSettings, ScanError> {
        let settings = self.settings()?;
        self.gate().reconfigure(
            settings.requests_per_minute.default as f64,
            settings.request_timeout_seconds.default.max(1) as u64,
        );
        Ok(settings)
    }

    /// Stores a new range for one tunable and re-applies gate settings
    pub fn update_setting(
        &self,
        setting: Setting,
        range: SettingRange,
    ) -> Result<SettingRange, ScanError> {
        let stored = self.storage().update_range(setting, range)?;
        self.apply_settings()?;
        Ok(stored)
    }

    /// Resolves a submission against stored settings and seeds
    ///
    /// Explicit URLs are used when at least one of them is valid; otherwise
    /// the enabled seeds are scanned.
    ///
    /// # Errors
    ///
    /// [`ScanError::NoValidUrls`] if neither source yields a valid URL.
    pub fn resolve(&self, request: &ScanRequest) -> Result<ResolvedScan, ScanError> {
        let keywords = parse_keywords(&request.keywords);

        let (settings, urls) = {
            let storage = self.storage();
            let settings = storage.load_settings()?;
            let urls = normalize_scan_urls(&request.urls);
            if urls.is_empty() {
                let seeds: Vec<String> = storage
                    .enabled_seeds()?
                    .into_iter()
                    .map(|seed| seed.url)
                    .collect();
                (settings, normalize_scan_urls(&seeds))
            } else {
                (settings, urls)
            }
        };

        if urls.is_empty() {
            return Err(ScanError::NoValidUrls);
        }

        Ok(ResolvedScan {
            keywords,
            urls,
            budget: CrawlBudget::resolve(request, &settings),
        })
    }

    /// Starts a scan in the background and returns its job id
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(&self, request: ScanRequest) -> Result<String, ScanError> {
        let scan = self.resolve(&request)?;
        let job_id = uuid::Uuid::new_v4().simple().to_string();

        lock_jobs(&self.jobs).insert(job_id.clone(), ScanJob::new(job_id.clone(), scan.urls.len()));

        tracing::info!("Scan {} queued with {} URL(s)", job_id, scan.urls.len());

        tokio::spawn(run_scan(
            self.crawler.clone(),
            Arc::clone(&self.jobs),
            job_id.clone(),
            scan,
            self.options.clone(),
        ));

        Ok(job_id)
    }

    /// Snapshot of a job
    pub fn status(&self, job_id: &str) -> Result<ScanJob, ScanError> {
        lock_jobs(&self.jobs)
            .get(job_id)
            .cloned()
            .ok_or_else(|| ScanError::JobNotFound(job_id.to_string()))
    }

    /// Number of jobs known to this process
    pub fn job_count(&self) -> usize {
        lock_jobs(&self.jobs).len()
    }
}

fn lock_jobs(jobs: &Mutex<HashMap<String, ScanJob>>) -> MutexGuard<'_, HashMap<String, ScanJob>> {
    match jobs.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Background worker for one job
async fn run_scan(
    crawler: Crawler,
    jobs: JobTable,
    job_id: String,
    scan: ResolvedScan,
    options: ScanOptions,
) {
    let total = scan.urls.len();
    tracing::info!("Scan {} started with {} URL(s)", job_id, total);

    let mut results = JobResults::default();

    for (index, url) in scan.urls.iter().enumerate() {
        let seed = url.as_str();

        {
            let mut table = lock_jobs(&jobs);
            if let Some(job) = table.get_mut(&job_id) {
                job.begin_seed(index + 1, seed);
            }
        }
        tracing::info!("Scan {} progress {}/{}: {}", job_id, index + 1, total, seed);

        match run_seed(&crawler, scan.crawl_params(url), options.seed_deadline).await {
            Ok(report) => results.record_report(seed, &report),
            Err(e) => {
                tracing::error!("Scan {}: {}", job_id, e);
                let message = match e {
                    ScanError::CrawlFailed { message, .. } => message,
                    other => other.to_string(),
                };
                results.record_failure(seed, message);
            }
        }

        tokio::time::sleep(options.seed_pacing).await;
    }

    let (matches, errors) = (results.matches.len(), results.errors.len());
    {
        let mut table = lock_jobs(&jobs);
        if let Some(job) = table.get_mut(&job_id) {
            job.complete(results);
        }
    }

    tracing::info!(
        "Scan {} finished: {} match(es), {} error(s)",
        job_id,
        matches,
        errors
    );
}

/// Crawls one seed as its own task so a panic or deadline only costs this seed
async fn run_seed(
    crawler: &Crawler,
    params: CrawlParams,
    deadline: Option<Duration>,
) -> Result<CrawlReport, ScanError> {
    let url = params.start_url.to_string();
    let crawler = crawler.clone();
    let mut handle = tokio::spawn(async move { crawler.crawl(&params).await });

    let joined = match deadline {
        Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
            Ok(joined) => joined,
            Err(_) => {
                handle.abort();
                return Err(ScanError::CrawlFailed {
                    url,
                    message: format!("crawl exceeded deadline of {:.1}s", limit.as_secs_f64()),
                });
            }
        },
        None => handle.await,
    };

    joined.map_err(|e| ScanError::CrawlFailed {
        url,
        message: format!("crawl task failed: {}", e),
    })
}
