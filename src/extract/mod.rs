//! Extraction pipeline from rendered HTML to clean Markdown
//!
//! This module provides:
//! - Site and framework selector tables with framework auto-detection
//! - DOM cleanup (element removal, code-language propagation, GFM markers)
//! - HTML to Markdown conversion and boilerplate stripping
//! - Classification of challenge pages and empty content

mod clean;
mod convert;
mod sites;
mod validate;

pub use clean::{absolutize_urls, normalize_markup, remove_elements, select_content, UNIVERSAL_REMOVALS};
pub use convert::{convert_to_markdown, strip_boilerplate};
pub use sites::{detect_framework, framework_score, Framework, SiteConfig, SiteRegistry, DETECTION_THRESHOLD};
pub use validate::{classify_reader_warning, validate_content};

use url::Url;

/// Turns a rendered document into Markdown using the given site config
///
/// # Steps
///
/// 1. Remove the config's unwanted elements and the universal set
/// 2. Normalize code-language hints, strikethrough and checkboxes
/// 3. Keep the content region (whole body if the selector matches nothing)
/// 4. Make relative links and images absolute against `page_url`
/// 5. Convert to Markdown and strip footer boilerplate
///
/// # Example
///
/// ```
/// use docmirror::extract::{html_to_markdown, SiteConfig};
/// use url::Url;
///
/// let html = "<html><body><nav>Menu</nav><main><h1>Setup</h1></main></body></html>";
/// let url = Url::parse("https://x.com/docs/setup").unwrap();
/// let markdown = html_to_markdown(html, &url, &SiteConfig::generic());
/// assert!(markdown.contains("# Setup"));
/// assert!(!markdown.contains("Menu"));
/// ```
pub fn html_to_markdown(html: &str, page_url: &Url, config: &SiteConfig) -> String {
    let cleaned = remove_elements(html, &config.remove_selectors);
    let cleaned = normalize_markup(&cleaned);
    let content = select_content(&cleaned, &config.content_selector);
    let content = absolutize_urls(&content, page_url);
    let markdown = convert_to_markdown(&content);
    strip_boilerplate(&markdown)
}
