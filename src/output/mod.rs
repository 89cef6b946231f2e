//! Output module for exporting finished scans
//!
//! This module handles:
//! - Generating markdown summaries of scan results
//! - Exporting the full job record as JSON

mod json;
mod markdown;

pub use json::write_json_report;
pub use markdown::{format_markdown_summary, write_markdown_summary};

use thiserror::Error;

/// Errors that can occur while writing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
