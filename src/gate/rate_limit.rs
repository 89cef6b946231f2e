//! Global rate limiting for outbound page fetches
//!
//! One limiter guards all traffic through a gate, so the requests-per-minute
//! contract holds across every concurrently running scan.

use rand::Rng;
use std::time::{Duration, Instant};

/// Lowest accepted request rate; keeps the interval finite
pub const MIN_REQUESTS_PER_MINUTE: f64 = 0.1;

/// Minimum spacing between two requests at a given rate
pub fn min_interval(requests_per_minute: f64) -> Duration {
    Duration::from_secs_f64(60.0 / requests_per_minute.max(MIN_REQUESTS_PER_MINUTE))
}

/// Tracks the last real fetch and spaces the next one out
#[derive(Debug)]
pub struct RateLimiter {
    last_fetch: Option<Instant>,
    jitter_min: Duration,
    jitter_max: Duration,
}

impl RateLimiter {
    pub fn new(jitter_min: Duration, jitter_max: Duration) -> Self {
        Self {
            last_fetch: None,
            jitter_min,
            jitter_max,
        }
    }

    /// Time left before the next fetch may start, if any
    pub fn delay_needed(&self, interval: Duration, now: Instant) -> Option<Duration> {
        let last = self.last_fetch?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < interval {
            Some(interval - elapsed)
        } else {
            None
        }
    }

    /// Random extra delay in `[jitter_min, jitter_max)`
    pub fn jitter(&self) -> Duration {
        if self.jitter_max <= self.jitter_min {
            return self.jitter_min;
        }
        let min = self.jitter_min.as_millis() as u64;
        let max = self.jitter_max.as_millis() as u64;
        Duration::from_millis(rand::rng().random_range(min..max))
    }

    /// Sleeps until `interval` has passed since the previous fetch, then
    /// stamps the current fetch
    ///
    /// Jitter is only added when a wait is needed at all.
    pub async fn wait(&mut self, interval: Duration) {
        if let Some(delay) = self.delay_needed(interval, Instant::now()) {
            let total = delay + self.jitter();
            tracing::debug!("Rate limit: waiting {:?}", total);
            tokio::time::sleep(total).await;
        }
        self.last_fetch = Some(Instant::now());
    }

    pub fn last_fetch(&self) -> Option<Instant> {
        self.last_fetch
    }
}
