//! HTML to Markdown conversion and boilerplate removal

use htmd::options::{CodeBlockStyle, HeadingStyle, Options};
use htmd::HtmlToMarkdown;
use regex::Regex;
use std::sync::LazyLock;

static LINK_CLUSTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?mi)^(?:#{1,6}[ \t]*)?(?:\*\*)?(?:Resources|Support|Company|Community|Legal|More|Social)(?:\*\*)?[ \t]*\n(?:[ \t]*\n)*(?:[ \t]*(?:[-*+][ \t]+)?\[[^\]\n]*\]\([^)\n]*\)[ \t]*(?:\n|$))+",
    )
    .expect("valid regex")
});

static COPYRIGHT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*(?:©|&copy;|\(c\)|copyright\b)[^\n]{0,200}$").expect("valid regex")
});

static LAST_UPDATED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*[*_]{0,2}last updated[^\n]{0,150}$").expect("valid regex")
});

static FEEDBACK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[^\n]{0,40}was this (?:page|article|doc|section) helpful[^\n]*$")
        .expect("valid regex")
});

static EDIT_PAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*\[?[^\n\]]{0,8}edit (?:this page|on github)[^\n]*$")
        .expect("valid regex")
});

static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Converts an HTML fragment to Markdown
///
/// Headings are ATX style and code blocks are fenced, keeping the `language-*` class of
/// the code element as the fence info string.
pub fn convert_to_markdown(html: &str) -> String {
    let converter = HtmlToMarkdown::builder()
        .options(Options {
            heading_style: HeadingStyle::Atx,
            code_block_style: CodeBlockStyle::Fenced,
            ..Default::default()
        })
        .skip_tags(vec!["script", "style", "noscript", "template"])
        .build();

    match converter.convert(html) {
        Ok(markdown) => markdown,
        Err(e) => {
            tracing::warn!("Markdown conversion failed, keeping text only: {}", e);
            let doc = scraper::Html::parse_fragment(html);
            doc.root_element().text().collect::<String>()
        }
    }
}

/// Removes footer boilerplate and collapses runs of blank lines
pub fn strip_boilerplate(markdown: &str) -> String {
    let text = markdown.replace("\r\n", "\n");
    let text = LINK_CLUSTER_RE.replace_all(&text, "");
    let text = COPYRIGHT_RE.replace_all(&text, "");
    let text = LAST_UPDATED_RE.replace_all(&text, "");
    let text = FEEDBACK_RE.replace_all(&text, "");
    let text = EDIT_PAGE_RE.replace_all(&text, "");
    let text = BLANK_LINES_RE.replace_all(&text, "\n\n");

    let trimmed = text.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}\n", trimmed)
    }
}
