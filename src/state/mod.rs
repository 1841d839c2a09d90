//! State module for tracking crawl progress
//!
//! This module provides the per-invocation state of a crawl.
//!
//! # Components
//!
//! - `Outcome`: the final result for one URL (saved, blocked or failed)
//! - `CrawlReport`: all outcomes of a crawl plus its timestamps
//! - `NumberingCounter`: per-directory sequence numbers for numbered output

mod numbering;
mod outcome;

// Re-export main types
pub use numbering::{NumberingCounter, Reservation};
pub use outcome::{BlockReason, CrawlReport, Outcome};
