//! Priority frontier for one crawl invocation
//!
//! Highest score pops first; among equal scores, the entry discovered first
//! pops first. Entries with a score of zero or less are refused on push.
//! Duplicate URLs may coexist; the crawl loop drops them on pop.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use url::Url;

/// A discovered link waiting to be fetched
#[derive(Debug, Clone)]
pub struct FrontierEntry {
    /// Normalized URL (fragment stripped)
    pub url: Url,
    pub anchor_text: String,
    pub score: i32,
    pub depth: u32,
    /// Discovery order within the crawl
    sequence: u64,
}

// BinaryHeap is a max-heap: higher score is greater, and for equal scores
// the lower sequence number is greater so it pops first
impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score && self.sequence == other.sequence
    }
}

impl Eq for FrontierEntry {}

/// Max-score-first queue of discovered links
#[derive(Debug, Default)]
pub struct Frontier {
    heap: BinaryHeap<FrontierEntry>,
    next_sequence: u64,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a link; returns false if its score is not positive
    pub fn push(&mut self, url: Url, anchor_text: String, score: i32, depth: u32) -> bool {
        if score <= 0 {
            return false;
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(FrontierEntry {
            url,
            anchor_text,
            score,
            depth,
            sequence,
        });
        true
    }

    pub fn pop(&mut self) -> Option<FrontierEntry> {
        self.heap.pop()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
