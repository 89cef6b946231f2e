//! Per-origin robots.txt policy cache
//!
//! Policies are fetched lazily, once per origin, and kept for the lifetime
//! of the politeness gate that owns the cache.

use crate::robots::ParsedRobots;
use std::collections::HashMap;

/// Robots.txt policies keyed by site origin (`scheme://host[:port]`)
#[derive(Debug, Default)]
pub struct RobotsCache {
    policies: HashMap<String, ParsedRobots>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached policy for an origin, if one was fetched
    pub fn get(&self, origin: &str) -> Option<&ParsedRobots> {
        self.policies.get(origin)
    }

    /// Stores the policy for an origin, replacing any previous one
    pub fn insert(&mut self, origin: String, policy: ParsedRobots) {
        self.policies.insert(origin, policy);
    }

    /// Returns the cached policy for an origin, storing `policy` first if
    /// none is cached yet
    pub fn get_or_insert(&mut self, origin: String, policy: ParsedRobots) -> &ParsedRobots {
        self.policies.entry(origin).or_insert(policy)
    }

    /// Number of origins with a cached policy
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
