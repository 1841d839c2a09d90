//! URL handling module for docmirror
//!
//! This module provides URL normalization, host allowlist matching, and the mapping
//! from page URLs onto the local mirror layout.

mod matcher;
mod normalize;
mod paths;

// Re-export main functions
pub use matcher::{host_in_list, host_matches};
pub use normalize::{canonicalize, normalize_url};
pub use paths::{add_numbered_prefix, detect_base_path, to_local_path, DOC_ROOT_SEGMENTS};
