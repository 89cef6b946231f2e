//! TTL-bounded response cache keyed by normalized URL

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::time::Duration;

/// Expired entries are swept after this many inserts
const PRUNE_INTERVAL: usize = 64;

/// One cached page body
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub url: String,
    pub fetched_at: DateTime<Utc>,
    pub html: String,
}

/// Response cache shared by every crawl going through one gate
#[derive(Debug)]
pub struct ResponseCache {
    entries: HashMap<String, CacheEntry>,
    ttl: ChronoDuration,
    inserts_since_prune: usize,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        let ttl = ChronoDuration::from_std(ttl).unwrap_or_else(|_| ChronoDuration::days(36_500));
        Self {
            entries: HashMap::new(),
            ttl,
            inserts_since_prune: 0,
        }
    }

    /// Returns the cached body if it is younger than the TTL
    pub fn get(&self, url: &str) -> Option<&str> {
        self.get_at(url, Utc::now())
    }

    /// Same as [`get`](Self::get) with an explicit clock
    pub fn get_at(&self, url: &str, now: DateTime<Utc>) -> Option<&str> {
        self.entries
            .get(url)
            .filter(|entry| now.signed_duration_since(entry.fetched_at) < self.ttl)
            .map(|entry| entry.html.as_str())
    }

    pub fn insert(&mut self, url: String, html: String) {
        self.insert_at(url, html, Utc::now());
    }

    pub fn insert_at(&mut self, url: String, html: String, fetched_at: DateTime<Utc>) {
        self.entries.insert(
            url.clone(),
            CacheEntry {
                url,
                fetched_at,
                html,
            },
        );

        self.inserts_since_prune += 1;
        if self.inserts_since_prune >= PRUNE_INTERVAL {
            self.prune_expired(fetched_at);
        }
    }

    /// Drops every entry that is no longer fresh at `now`
    pub fn prune_expired(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| now.signed_duration_since(entry.fetched_at) < ttl);
        self.inserts_since_prune = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
