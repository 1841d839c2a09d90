//! Configuration module for docmirror
//!
//! Crawl options come from the command line and, optionally, a TOML file whose values
//! the command line overrides. The file may also extend the site configuration table.
//!
//! # Example
//!
//! ```no_run
//! use docmirror::config::{load_config, CrawlOptions};
//! use std::path::Path;
//!
//! let file = load_config(Path::new("docmirror.toml")).unwrap();
//! let mut options = CrawlOptions::default();
//! file.apply_to(&mut options);
//! println!("Crawler will use max depth: {}", options.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{AdapterKind, CrawlMode, CrawlOptions, CrawlSection, FileConfig, SiteEntry};

// Re-export parser and validation functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate_host_pattern, validate_options, MAX_CONCURRENCY};
