//! Console summary of a finished crawl

use crate::state::{CrawlReport, Outcome};

/// Blocked and failed URLs listed before the list is cut short
const MAX_LISTED: usize = 20;

/// Prints the end-of-run summary to stdout
pub fn print_report(report: &CrawlReport) {
    print!("{}", format_report(report));
}

/// Formats the end-of-run summary
///
/// Blocked URLs are listed with their reason and followed by a hint to retry through the
/// reader API.
pub fn format_report(report: &CrawlReport) -> String {
    let mut out = String::new();

    out.push_str("=== Crawl Statistics ===\n\n");

    out.push_str("Overview:\n");
    out.push_str(&format!("  Entry URL: {}\n", report.entry_url));
    out.push_str(&format!("  Pages processed: {}\n", report.total()));
    out.push_str(&format!("  Saved: {}\n", report.saved.len()));
    out.push_str(&format!("  Blocked: {}\n", report.blocked.len()));
    out.push_str(&format!("  Failed: {}\n", report.failed.len()));
    if let Some(duration) = report.duration_seconds() {
        out.push_str(&format!("  Duration: {}s\n", duration));
    }
    out.push('\n');

    let by_adapter = report.saved_by_adapter();
    if !by_adapter.is_empty() {
        out.push_str("Saved by Adapter:\n");
        for (adapter, count) in by_adapter {
            out.push_str(&format!("  {}: {}\n", adapter, count));
        }
        out.push('\n');
    }

    if !report.blocked.is_empty() {
        out.push_str(&format!("Blocked URLs ({}):\n", report.blocked.len()));
        for outcome in report.blocked.iter().take(MAX_LISTED) {
            if let Outcome::Blocked { url, reason } = outcome {
                out.push_str(&format!("  - {} ({})\n", url, reason.description()));
            }
        }
        push_overflow(&mut out, report.blocked.len());
        out.push_str("\nSome pages were blocked. Retry with --jina to fetch them through the reader API.\n\n");
    }

    if !report.failed.is_empty() {
        out.push_str(&format!("Failed URLs ({}):\n", report.failed.len()));
        for outcome in report.failed.iter().take(MAX_LISTED) {
            if let Outcome::Failed { url, message } = outcome {
                out.push_str(&format!("  - {}: {}\n", url, message));
            }
        }
        push_overflow(&mut out, report.failed.len());
        out.push('\n');
    }

    out.push_str(&format!(
        "Success Rate: {:.1}% ({} / {} pages saved)\n",
        report.success_rate(),
        report.saved.len(),
        report.total()
    ));

    out
}

fn push_overflow(out: &mut String, total: usize) {
    if total > MAX_LISTED {
        out.push_str(&format!("  ... and {} more\n", total - MAX_LISTED));
    }
}
