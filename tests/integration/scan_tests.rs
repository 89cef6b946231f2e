//! Scan job tests: submission, background execution and polling

use crate::common::{dump_lines, fast_gate, mount_page};
use leakwatch::scan::{KeywordMatch, ScanOptions, SeedStats};
use leakwatch::storage::{SeedStatus, SeedStore, SqliteStorage};
use leakwatch::{JobStatus, ScanError, ScanJob, ScanRequest, ScanService};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service_with(storage: SqliteStorage, seed_deadline: Option<Duration>) -> ScanService {
    ScanService::new(fast_gate(), Arc::new(Mutex::new(storage))).with_options(ScanOptions {
        seed_pacing: Duration::from_millis(10),
        seed_deadline,
    })
}

fn service() -> ScanService {
    service_with(SqliteStorage::new_in_memory().unwrap(), None)
}

async fn wait_for_completion(service: &ScanService, job_id: &str) -> ScanJob {
    let started = Instant::now();
    loop {
        let job = service.status(job_id).unwrap();
        if job.is_complete() {
            return job;
        }
        assert!(
            started.elapsed() < Duration::from_secs(20),
            "scan {} did not finish",
            job_id
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

fn seed_url(server: &MockServer) -> String {
    format!("{}/", server.uri())
}

#[tokio::test]
async fn test_unreachable_seed_completes_with_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let service = service();
    let job_id = service
        .submit(ScanRequest::new("password, leak").with_urls([server.uri()]))
        .unwrap();
    let job = wait_for_completion(&service, &job_id).await;

    assert_eq!(job.status, JobStatus::Complete);
    assert!(job.completed_at.is_some());
    assert!(job.matches.is_empty());
    assert_eq!(job.errors.len(), 1);
    assert_eq!(job.errors[0].url, seed_url(&server));
    assert_eq!(job.errors[0].error, "HTTP 503");
    assert_eq!(job.stats.len(), 1);
    assert_eq!(job.stats[0].url, seed_url(&server));
    assert_eq!(job.stats[0].pages_scanned, 0);
    assert_eq!(job.progress.current, 1);
    assert_eq!(job.progress.total, 1);
}

#[tokio::test]
async fn test_keyword_matches_are_flattened() {
    let server = MockServer::start().await;
    let body = format!(
        "<h1>Leak Database</h1><p>password dump</p><pre>{}</pre>",
        dump_lines(150)
    );
    mount_page(&server, "/", &body).await;

    let service = service();
    let job_id = service
        .submit(ScanRequest::new("leak,password,absent").with_urls([server.uri()]))
        .unwrap();
    let job = wait_for_completion(&service, &job_id).await;

    assert!(job.errors.is_empty());
    assert_eq!(
        job.matches,
        vec![
            KeywordMatch {
                keyword: "leak".to_string(),
                url: seed_url(&server),
            },
            KeywordMatch {
                keyword: "password".to_string(),
                url: seed_url(&server),
            },
        ]
    );
    assert_eq!(job.stats.len(), 1);
    assert_eq!(job.stats[0].pages_scanned, 0);
}

#[tokio::test]
async fn test_seeds_are_scanned_in_order() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    mount_page(&first, "/", "<p>first</p>").await;
    mount_page(&second, "/", "<p>second</p>").await;

    let service = service();
    let job_id = service
        .submit(ScanRequest::new("leak").with_urls([first.uri(), second.uri()]))
        .unwrap();
    let job = wait_for_completion(&service, &job_id).await;

    let urls: Vec<&str> = job.stats.iter().map(|s| s.url.as_str()).collect();
    assert_eq!(urls, vec![seed_url(&first), seed_url(&second)]);
    assert_eq!(job.progress.current, 2);
    assert_eq!(job.progress.current_url.as_deref(), Some(seed_url(&second).as_str()));
}

#[tokio::test]
async fn test_job_is_scanning_while_seed_runs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<p>slow</p>")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let service = service();
    let job_id = service
        .submit(ScanRequest::new("leak").with_urls([server.uri()]))
        .unwrap();

    let running = service.status(&job_id).unwrap();
    assert_eq!(running.status, JobStatus::Scanning);
    assert_eq!(running.progress.total, 1);
    assert!(running.stats.is_empty());
    assert!(running.completed_at.is_none());

    let job = wait_for_completion(&service, &job_id).await;
    assert_eq!(job.status, JobStatus::Complete);
    assert_eq!(job.stats.len(), 1);
}

#[tokio::test]
async fn test_seed_deadline_records_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<p>slow</p>")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let service = service_with(
        SqliteStorage::new_in_memory().unwrap(),
        Some(Duration::from_millis(200)),
    );
    let job_id = service
        .submit(ScanRequest::new("leak").with_urls([server.uri()]))
        .unwrap();
    let job = wait_for_completion(&service, &job_id).await;

    assert_eq!(job.errors.len(), 1);
    assert!(job.errors[0].error.contains("deadline"));
    assert_eq!(job.stats, vec![SeedStats::placeholder(&seed_url(&server))]);
}

#[tokio::test]
async fn test_enabled_seeds_are_used_without_urls() {
    let enabled = MockServer::start().await;
    let disabled = MockServer::start().await;
    mount_page(&enabled, "/", "<p>enabled</p>").await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&disabled)
        .await;

    let mut storage = SqliteStorage::new_in_memory().unwrap();
    storage
        .add_seed(&enabled.uri(), "Enabled", SeedStatus::Enabled)
        .unwrap();
    storage
        .add_seed(&disabled.uri(), "Disabled", SeedStatus::Disabled)
        .unwrap();

    let service = service_with(storage, None);
    let job_id = service.submit(ScanRequest::new("leak")).unwrap();
    let job = wait_for_completion(&service, &job_id).await;

    assert_eq!(job.progress.total, 1);
    assert_eq!(job.stats.len(), 1);
    assert_eq!(job.stats[0].url, seed_url(&enabled));
}

#[tokio::test]
async fn test_submit_without_urls_or_seeds_fails() {
    let service = service();

    let result = service.submit(ScanRequest::new("leak").with_urls(["not a url"]));

    assert!(matches!(result, Err(ScanError::NoValidUrls)));
    assert_eq!(service.job_count(), 0);
}

#[tokio::test]
async fn test_unknown_job_id() {
    let service = service();

    let result = service.status("does-not-exist");

    assert!(matches!(result, Err(ScanError::JobNotFound(id)) if id == "does-not-exist"));
}

#[tokio::test]
async fn test_job_ids_are_unique() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<p>home</p>").await;

    let service = service();
    let first = service
        .submit(ScanRequest::new("leak").with_urls([server.uri()]))
        .unwrap();
    let second = service
        .submit(ScanRequest::new("leak").with_urls([server.uri()]))
        .unwrap();

    assert_ne!(first, second);
    assert_eq!(service.job_count(), 2);

    wait_for_completion(&service, &first).await;
    wait_for_completion(&service, &second).await;
}
