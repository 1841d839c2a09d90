//! Mapping of page URLs onto the local mirror layout

use std::path::{Path, PathBuf};
use url::Url;

/// Path segments that mark the start of a documentation hierarchy
pub const DOC_ROOT_SEGMENTS: &[&str] = &[
    "docs",
    "documentation",
    "guide",
    "guides",
    "api",
    "reference",
];

/// Extensions dropped from the final path segment before `.md` is appended
const PAGE_EXTENSIONS: &[&str] = &[".html", ".htm", ".mdx", ".md"];

/// Returns the index of the first documentation-root segment, if any
fn doc_root_index(segments: &[&str]) -> Option<usize> {
    segments.iter().position(|segment| {
        DOC_ROOT_SEGMENTS
            .iter()
            .any(|root| segment.eq_ignore_ascii_case(root))
    })
}

fn path_segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

/// Replaces characters that are not portable in file names
fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\\' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect()
}

/// Maps a page URL to the relative file path of its Markdown mirror
///
/// The first path segment from [`DOC_ROOT_SEGMENTS`] marks the documentation root; the
/// segments after it become the output path and the last one becomes the file stem. When
/// nothing remains the page is `index.md`. URLs without a documentation root keep their
/// whole path.
///
/// # Examples
///
/// ```
/// use docmirror::url::to_local_path;
/// use std::path::PathBuf;
/// use url::Url;
///
/// let url = Url::parse("https://x.com/docs/guide/setup").unwrap();
/// assert_eq!(to_local_path(&url), PathBuf::from("guide/setup.md"));
///
/// let url = Url::parse("https://x.com/docs/").unwrap();
/// assert_eq!(to_local_path(&url), PathBuf::from("index.md"));
/// ```
pub fn to_local_path(url: &Url) -> PathBuf {
    let segments = path_segments(url);
    let start = doc_root_index(&segments).map_or(0, |idx| idx + 1);

    let mut parts: Vec<String> = segments[start..]
        .iter()
        .filter(|s| **s != "." && **s != "..")
        .map(|s| sanitize_segment(s))
        .collect();

    let stem = match parts.pop() {
        Some(last) => {
            let lower = last.to_ascii_lowercase();
            let trimmed = PAGE_EXTENSIONS
                .iter()
                .find(|ext| lower.ends_with(*ext))
                .map(|ext| last[..last.len() - ext.len()].to_string())
                .unwrap_or(last);
            if trimmed.is_empty() {
                "index".to_string()
            } else {
                trimmed
            }
        }
        None => "index".to_string(),
    };

    let mut path: PathBuf = parts.iter().collect();
    path.push(format!("{}.md", stem));
    path
}

/// Inserts a zero-padded sequence number in front of the file name
///
/// Any directory prefix is preserved.
///
/// # Examples
///
/// ```
/// use docmirror::url::add_numbered_prefix;
/// use std::path::{Path, PathBuf};
///
/// let numbered = add_numbered_prefix(Path::new("guide/setup.md"), 3, 2);
/// assert_eq!(numbered, PathBuf::from("guide/03-setup.md"));
/// ```
pub fn add_numbered_prefix(path: &Path, number: u32, digits: usize) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let numbered = format!("{:0width$}-{}", number, file_name, width = digits);

    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(numbered),
        _ => PathBuf::from(numbered),
    }
}

/// Detects the documentation base path of a URL
///
/// Returns the first documentation-root segment wrapped as `/segment/`, or `None` when the
/// URL path has no such segment. Only the first path segment is considered, so
/// `https://x.com/docs/api/` yields `/docs/`.
pub fn detect_base_path(url: &Url) -> Option<String> {
    let segments = path_segments(url);
    let first = segments.first()?;
    DOC_ROOT_SEGMENTS
        .iter()
        .any(|root| first.eq_ignore_ascii_case(root))
        .then(|| format!("/{}/", first))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(url: &str) -> PathBuf {
        to_local_path(&Url::parse(url).unwrap())
    }

    #[test]
    fn test_nested_doc_path() {
        assert_eq!(local("https://x.com/docs/guide/setup"), PathBuf::from("guide/setup.md"));
    }

    #[test]
    fn test_doc_root_is_index() {
        assert_eq!(local("https://x.com/docs/"), PathBuf::from("index.md"));
        assert_eq!(local("https://x.com/docs"), PathBuf::from("index.md"));
    }

    #[test]
    fn test_site_root_is_index() {
        assert_eq!(local("https://x.com/"), PathBuf::from("index.md"));
    }

    #[test]
    fn test_trailing_slash_page() {
        assert_eq!(local("https://x.com/docs/guide/"), PathBuf::from("guide.md"));
    }

    #[test]
    fn test_no_doc_root_keeps_path() {
        assert_eq!(local("https://x.com/blog/post-1"), PathBuf::from("blog/post-1.md"));
    }

    #[test]
    fn test_doc_root_in_middle() {
        assert_eq!(
            local("https://x.com/en/latest/reference/cli"),
            PathBuf::from("cli.md")
        );
    }

    #[test]
    fn test_strips_page_extension() {
        assert_eq!(local("https://x.com/docs/intro.html"), PathBuf::from("intro.md"));
        assert_eq!(local("https://x.com/docs/a/b.mdx"), PathBuf::from("a/b.md"));
        assert_eq!(local("https://x.com/docs/index.html"), PathBuf::from("index.md"));
    }

    #[test]
    fn test_case_insensitive_root() {
        assert_eq!(local("https://x.com/Docs/Intro"), PathBuf::from("Intro.md"));
    }

    #[test]
    fn test_unsafe_characters_replaced() {
        assert_eq!(local("https://x.com/docs/a:b"), PathBuf::from("a-b.md"));
    }

    #[test]
    fn test_numbered_prefix_with_directory() {
        assert_eq!(
            add_numbered_prefix(Path::new("guide/setup.md"), 3, 2),
            PathBuf::from("guide/03-setup.md")
        );
    }

    #[test]
    fn test_numbered_prefix_top_level() {
        assert_eq!(
            add_numbered_prefix(Path::new("index.md"), 1, 2),
            PathBuf::from("01-index.md")
        );
    }

    #[test]
    fn test_numbered_prefix_wider_than_digits() {
        assert_eq!(
            add_numbered_prefix(Path::new("a.md"), 123, 2),
            PathBuf::from("123-a.md")
        );
        assert_eq!(
            add_numbered_prefix(Path::new("a.md"), 7, 3),
            PathBuf::from("007-a.md")
        );
    }

    #[test]
    fn test_detect_base_path() {
        let url = Url::parse("https://x.com/docs/guide/setup").unwrap();
        assert_eq!(detect_base_path(&url), Some("/docs/".to_string()));

        let url = Url::parse("https://x.com/api/v1").unwrap();
        assert_eq!(detect_base_path(&url), Some("/api/".to_string()));
    }

    #[test]
    fn test_detect_base_path_none() {
        let url = Url::parse("https://x.com/blog/post").unwrap();
        assert_eq!(detect_base_path(&url), None);

        let url = Url::parse("https://x.com/").unwrap();
        assert_eq!(detect_base_path(&url), None);
    }
}
