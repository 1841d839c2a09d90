//! Output module for the Markdown mirror and crawl summaries
//!
//! This module handles:
//! - Writing converted pages under the output directory
//! - Printing the end-of-run summary
//! - Exporting a Markdown report of the run

mod markdown;
pub mod stats;
mod writer;

pub use markdown::{format_markdown_summary, write_markdown_summary};
pub use stats::{format_report, print_report};
pub use writer::{FileWriter, WriteError};
