//! Crawl engine
//!
//! This module contains the per-seed crawling logic:
//! - The score-ordered frontier of discovered links
//! - The budgeted crawl loop producing a [`CrawlReport`]

mod engine;
mod frontier;

pub use engine::{
    crawl, may_descend, should_expand, CrawlParams, CrawlReport, Crawler,
    BASE_DEPTH_CEILING, HIGH_SCORE_DEPTH_CEILING, HIGH_SCORE_THRESHOLD,
};
pub use frontier::{Frontier, FrontierEntry};
