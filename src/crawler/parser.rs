//! Link extraction from fetched page content
//!
//! Page content is Markdown, possibly with embedded HTML or JSX, so links are found
//! with two scans:
//! - Markdown inline links `[text](target)`
//! - `href="target"` attributes

use crate::url::canonicalize;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static MARKDOWN_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[[^\]]*\]\(\s*<?([^)\s>]+)>?(?:\s+"[^"]*")?\s*\)"#).expect("valid regex")
});

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});

/// Hosts serving badges and images rather than documentation
const ASSET_HOSTS: &[&str] = &[
    "img.shields.io",
    "shields.io",
    "badge.fury.io",
    "badgen.net",
    "travis-ci.org",
    "codecov.io",
    "i.imgur.com",
    "raw.githubusercontent.com",
    "user-images.githubusercontent.com",
];

/// Path extensions that never name a documentation page
const SKIPPED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "bmp", "avif", "zip", "tar", "gz",
    "tgz", "bz2", "xz", "7z", "rar", "pdf", "mp4", "webm", "mov", "mp3", "wav", "ogg",
    "woff", "woff2", "ttf", "otf", "eot", "css", "js", "mjs", "map", "json", "xml", "txt",
    "exe", "dmg", "pkg", "deb", "rpm",
];

/// Filters applied to extracted links
#[derive(Debug, Clone, Default)]
pub struct LinkOptions {
    /// Keep links to other origins
    pub allow_external: bool,

    /// Keep only links whose path starts with this prefix
    pub base_path: Option<String>,
}

/// Extracts documentation links from page content
///
/// Returns normalized absolute URLs without duplicates, in order of first occurrence
/// across both link forms.
///
/// # Example
///
/// ```
/// use docmirror::crawler::{extract_links, LinkOptions};
/// use url::Url;
///
/// let base = Url::parse("https://x.com/docs/a").unwrap();
/// let options = LinkOptions { allow_external: false, base_path: Some("/docs/".to_string()) };
/// let links = extract_links("[b](/docs/b) [img](/docs/c.png)", &base, &options);
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].as_str(), "https://x.com/docs/b");
/// ```
pub fn extract_links(content: &str, base_url: &Url, options: &LinkOptions) -> Vec<Url> {
    let mut candidates: Vec<(usize, &str)> = MARKDOWN_LINK_RE
        .captures_iter(content)
        .chain(HREF_RE.captures_iter(content))
        .filter_map(|caps| caps.get(1))
        .map(|m| (m.start(), m.as_str()))
        .collect();
    candidates.sort_by_key(|(pos, _)| *pos);

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for (_, target) in candidates {
        if let Some(url) = resolve_link(target, base_url, options) {
            if seen.insert(url.to_string()) {
                links.push(url);
            }
        }
    }

    links
}

/// Resolves one link target and applies every filter
///
/// Returns None if the link should be excluded:
/// - empty, fragment-only, `mailto:`, `javascript:`, `tel:` and `data:` targets
/// - encoded angle brackets (template placeholders)
/// - non-HTTP(S) URLs after resolution
/// - other origins, unless allowed
/// - asset hosts, paths outside the base path, non-document extensions
fn resolve_link(target: &str, base_url: &Url, options: &LinkOptions) -> Option<Url> {
    let target = target.trim();
    let target = target.split('#').next().unwrap_or_default();

    if target.is_empty() {
        return None;
    }

    let lower = target.to_ascii_lowercase();
    if lower.starts_with("mailto:")
        || lower.starts_with("javascript:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    if lower.contains("%3c") || lower.contains("%3e") || lower.contains("&lt;") {
        return None;
    }

    let resolved = base_url.join(target).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }

    let host = resolved.host_str()?.to_ascii_lowercase();
    if !options.allow_external && resolved.origin() != base_url.origin() {
        return None;
    }

    if ASSET_HOSTS
        .iter()
        .any(|asset| host == *asset || host.ends_with(&format!(".{}", asset)))
    {
        return None;
    }

    if let Some(base_path) = &options.base_path {
        let prefix = base_path.trim_end_matches('/');
        let path = resolved.path();
        let inside = path == prefix || path.starts_with(&format!("{}/", prefix));
        if !inside {
            return None;
        }
    }

    if has_skipped_extension(resolved.path()) {
        return None;
    }

    canonicalize(resolved).ok()
}

fn has_skipped_extension(path: &str) -> bool {
    let last = path.rsplit('/').next().unwrap_or_default();
    match last.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            SKIPPED_EXTENSIONS.contains(&ext.as_str())
        }
        _ => false,
    }
}
