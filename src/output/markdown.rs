//! Markdown summary generation
//!
//! This module generates a human-readable Markdown report of a crawl, including
//! counts, per-adapter totals, and the URLs that were blocked or failed.

use crate::state::{CrawlReport, Outcome};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a Markdown summary of the crawl to `output_path`
///
/// # Arguments
///
/// * `report` - The finished crawl report
/// * `config_hash` - Fingerprint of the configuration file, when one was used
/// * `output_path` - Path where the markdown file should be written
pub fn write_markdown_summary(
    report: &CrawlReport,
    config_hash: Option<&str>,
    output_path: &Path,
) -> std::io::Result<()> {
    let markdown = format_markdown_summary(report, config_hash);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl report as Markdown
pub fn format_markdown_summary(report: &CrawlReport, config_hash: Option<&str>) -> String {
    let mut md = String::new();

    md.push_str("# docmirror Crawl Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Entry URL**: {}\n", report.entry_url));
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    if let Some(finished) = &report.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
    }
    if let Some(duration) = report.duration_seconds() {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    if let Some(hash) = config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    md.push_str("## Overall Statistics\n\n");
    md.push_str("| Outcome | Count |\n");
    md.push_str("|---------|-------|\n");
    md.push_str(&format!("| Saved | {} |\n", report.saved.len()));
    md.push_str(&format!("| Blocked | {} |\n", report.blocked.len()));
    md.push_str(&format!("| Failed | {} |\n", report.failed.len()));
    md.push_str(&format!("| **Total** | {} |\n\n", report.total()));
    md.push_str(&format!("- **Success Rate**: {:.2}%\n\n", report.success_rate()));

    let by_adapter = report.saved_by_adapter();
    if !by_adapter.is_empty() {
        md.push_str("## Saved by Adapter\n\n");
        md.push_str("| Adapter | Pages |\n");
        md.push_str("|---------|-------|\n");
        for (adapter, count) in by_adapter {
            md.push_str(&format!("| {} | {} |\n", adapter, count));
        }
        md.push('\n');
    }

    if !report.blocked.is_empty() {
        md.push_str("## Blocked URLs\n\n");
        for outcome in &report.blocked {
            if let Outcome::Blocked { url, reason } = outcome {
                md.push_str(&format!("- {} ({})\n", url, reason.as_str()));
            }
        }
        md.push_str("\nRetry with `--jina` to fetch blocked pages through the reader API.\n\n");
    }

    if !report.failed.is_empty() {
        md.push_str("## Failed URLs\n\n");
        for outcome in &report.failed {
            if let Outcome::Failed { url, message } = outcome {
                md.push_str(&format!("- {}: {}\n", url, message));
            }
        }
        md.push('\n');
    }

    md
}
