//! URL handling module for Leakwatch
//!
//! This module provides fragment normalization, seed validation, origin
//! extraction, and crawl-scope matching.

mod domain;
mod matcher;
mod normalize;

pub use domain::{extract_domain, home_url, origin_of};
pub use matcher::{in_crawl_scope, matches_wildcard};
pub use normalize::{normalize_url, validate_seed_url};
