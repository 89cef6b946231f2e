//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of finished
//! scans: per-seed statistics, keyword matches, and seed errors.

use crate::output::OutputResult;
use crate::scan::ScanJob;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary of a job to `output_path`
pub fn write_markdown_summary(job: &ScanJob, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(job);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a scan job as markdown
pub fn format_markdown_summary(job: &ScanJob) -> String {
    let mut md = String::new();

    md.push_str("# Leakwatch Scan Summary\n\n");

    md.push_str("## Scan Information\n\n");
    md.push_str(&format!("- **Scan ID**: {}\n", job.id));
    md.push_str(&format!("- **Status**: {}\n", job.status));
    md.push_str(&format!("- **Started**: {}\n", job.started_at.to_rfc3339()));
    if let Some(completed) = job.completed_at {
        md.push_str(&format!("- **Completed**: {}\n", completed.to_rfc3339()));
        let duration = (completed - job.started_at).num_milliseconds() as f64 / 1000.0;
        md.push_str(&format!("- **Duration**: {:.1} seconds\n", duration));
    }
    md.push_str(&format!(
        "- **Seeds**: {}/{}\n\n",
        job.progress.current, job.progress.total
    ));

    let pages: u32 = job.stats.iter().map(|s| s.pages_scanned).sum();
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Scanned**: {}\n", pages));
    md.push_str(&format!("- **Keyword Matches**: {}\n", job.matches.len()));
    md.push_str(&format!("- **Errors**: {}\n\n", job.errors.len()));

    if !job.stats.is_empty() {
        md.push_str("## Seeds\n\n");
        md.push_str("| URL | Pages | Max Depth | Elapsed (s) |\n");
        md.push_str("|-----|-------|-----------|-------------|\n");
        for stats in &job.stats {
            md.push_str(&format!(
                "| {} | {} | {} | {:.1} |\n",
                stats.url, stats.pages_scanned, stats.max_depth_reached, stats.elapsed_seconds
            ));
        }
        md.push('\n');
    }

    if !job.matches.is_empty() {
        let mut by_keyword: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for m in &job.matches {
            by_keyword
                .entry(m.keyword.as_str())
                .or_default()
                .push(m.url.as_str());
        }

        md.push_str("## Keyword Matches\n\n");
        for (keyword, urls) in by_keyword {
            md.push_str(&format!("### {} ({})\n\n", keyword, urls.len()));
            for url in urls {
                md.push_str(&format!("- {}\n", url));
            }
            md.push('\n');
        }
    }

    if !job.errors.is_empty() {
        md.push_str("## Errors\n\n");
        md.push_str("| URL | Error |\n");
        md.push_str("|-----|-------|\n");
        for error in &job.errors {
            md.push_str(&format!("| {} | {} |\n", error.url, error.error));
        }
        md.push('\n');
    }

    md
}
