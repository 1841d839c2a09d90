//! Site and framework selector tables
//!
//! A [`SiteConfig`] says where the content of a page lives and which elements must go
//! before conversion. Configs are looked up by exact hostname, or by [`Framework`] after
//! auto-detection on the rendered document.

use crate::config::SiteEntry;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// Minimum normalized score before a detected framework replaces the default config
pub const DETECTION_THRESHOLD: f64 = 0.3;

const SELECTOR_WEIGHT: f64 = 10.0;
const PATTERN_WEIGHT: f64 = 5.0;
const SCORE_DENOMINATOR: f64 = 30.0;

/// Documentation frameworks with a dedicated config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Docusaurus,
    VitePress,
    MkDocs,
    Mintlify,
    Nextra,
    GitBook,
    Sphinx,
}

impl Framework {
    pub const ALL: [Framework; 7] = [
        Framework::Docusaurus,
        Framework::VitePress,
        Framework::MkDocs,
        Framework::Mintlify,
        Framework::Nextra,
        Framework::GitBook,
        Framework::Sphinx,
    ];

    /// CSS selectors whose presence marks the framework
    fn marker_selectors(&self) -> &'static [&'static str] {
        match self {
            Self::Docusaurus => &["#__docusaurus", ".theme-doc-markdown", "nav.navbar"],
            Self::VitePress => &["#VPContent", ".VPDoc", ".vp-doc"],
            Self::MkDocs => &[".md-content", ".md-sidebar", "[data-md-component]"],
            Self::Mintlify => &["#content-area", "#sidebar-content", "[data-mintlify]"],
            Self::Nextra => &[".nextra-content", ".nextra-sidebar-container", "article.nextra-body"],
            Self::GitBook => &[".gitbook-root", "[data-testid=\"page.contentEditor\"]"],
            Self::Sphinx => &["div.sphinxsidebar", "div.document div.body", "a.headerlink"],
        }
    }

    /// Markup patterns matched against the raw document
    fn marker_patterns(&self) -> &'static [&'static str] {
        match self {
            Self::Docusaurus => &[r#"(?i)<meta[^>]+generator[^>]+Docusaurus"#, r"docusaurus"],
            Self::VitePress => &[r#"(?i)<meta[^>]+generator[^>]+VitePress"#, r"__VP_HASH_MAP__"],
            Self::MkDocs => &[r#"(?i)<meta[^>]+generator[^>]+mkdocs"#, r"mkdocs-material"],
            Self::Mintlify => &[r"(?i)mintlify", r"mintcdn\.com"],
            Self::Nextra => &[r"(?i)nextra", r"__NEXT_DATA__"],
            Self::GitBook => &[r"(?i)gitbook", r"gitbook\.io"],
            Self::Sphinx => &[r#"(?i)<meta[^>]+generator[^>]+Sphinx"#, r"_static/sphinx"],
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Docusaurus => "docusaurus",
            Self::VitePress => "vitepress",
            Self::MkDocs => "mkdocs",
            Self::Mintlify => "mintlify",
            Self::Nextra => "nextra",
            Self::GitBook => "gitbook",
            Self::Sphinx => "sphinx",
        };
        write!(f, "{}", name)
    }
}

/// Where a page's content lives and what to strip from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub content_selector: String,
    pub remove_selectors: Vec<String>,
    pub wait_for_selector: Option<String>,
    pub framework: Option<Framework>,
}

impl SiteConfig {
    fn new(content: &str, remove: &[&str], wait: Option<&str>, framework: Option<Framework>) -> Self {
        Self {
            content_selector: content.to_string(),
            remove_selectors: remove.iter().map(|s| s.to_string()).collect(),
            wait_for_selector: wait.map(str::to_string),
            framework,
        }
    }

    /// The generic config used when nothing more specific is known
    pub fn generic() -> Self {
        Self::new(
            "main, article, [role=\"main\"], .content, #content",
            &[
                "nav",
                "header",
                "footer",
                "aside",
                ".sidebar",
                ".table-of-contents",
                ".breadcrumbs",
                "[role=\"navigation\"]",
            ],
            Some("main, article"),
            None,
        )
    }

    /// The built-in config for a framework
    pub fn for_framework(framework: Framework) -> Self {
        let f = Some(framework);
        match framework {
            Framework::Docusaurus => Self::new(
                "article .theme-doc-markdown, article",
                &[
                    "nav",
                    "footer",
                    ".theme-doc-sidebar-container",
                    ".theme-doc-toc-desktop",
                    ".theme-doc-toc-mobile",
                    ".theme-doc-breadcrumbs",
                    ".theme-doc-footer",
                    ".pagination-nav",
                    ".theme-edit-this-page",
                    ".hash-link",
                ],
                Some("article"),
                f,
            ),
            Framework::VitePress => Self::new(
                ".vp-doc",
                &[
                    ".VPNav",
                    ".VPSidebar",
                    ".VPDocAside",
                    ".VPDocFooter",
                    ".VPLocalNav",
                    ".header-anchor",
                    "button.copy",
                ],
                Some(".vp-doc"),
                f,
            ),
            Framework::MkDocs => Self::new(
                ".md-content__inner",
                &[
                    ".md-header",
                    ".md-sidebar",
                    ".md-footer",
                    ".md-source-file",
                    ".md-content__button",
                    ".headerlink",
                ],
                Some(".md-content"),
                f,
            ),
            Framework::Mintlify => Self::new(
                "#content-area",
                &[
                    "#navbar",
                    "#sidebar",
                    "#table-of-contents",
                    "#pagination",
                    "footer",
                    "button",
                ],
                Some("#content-area"),
                f,
            ),
            Framework::Nextra => Self::new(
                "article main, article",
                &[
                    ".nextra-nav-container",
                    ".nextra-sidebar-container",
                    ".nextra-toc",
                    "footer",
                    ".nextra-breadcrumb",
                ],
                Some("article"),
                f,
            ),
            Framework::GitBook => Self::new(
                "main",
                &["header", "aside", "footer", "nav", "[aria-label=\"Table of contents\"]"],
                Some("main"),
                f,
            ),
            Framework::Sphinx => Self::new(
                "div.body, div[role=\"main\"]",
                &[
                    "div.sphinxsidebar",
                    "div.related",
                    "div.footer",
                    "a.headerlink",
                    ".rst-footer-buttons",
                ],
                Some("div.body, div[role=\"main\"]"),
                f,
            ),
        }
    }
}

/// Hosts with a known layout
const BUILTIN_HOSTS: &[(&str, Framework)] = &[
    ("docusaurus.io", Framework::Docusaurus),
    ("reactnative.dev", Framework::Docusaurus),
    ("jestjs.io", Framework::Docusaurus),
    ("vitepress.dev", Framework::VitePress),
    ("vitejs.dev", Framework::VitePress),
    ("vuejs.org", Framework::VitePress),
    ("squidfunk.github.io", Framework::MkDocs),
    ("docs.pydantic.dev", Framework::MkDocs),
    ("fastapi.tiangolo.com", Framework::MkDocs),
    ("mintlify.com", Framework::Mintlify),
    ("nextra.site", Framework::Nextra),
    ("docs.gitbook.com", Framework::GitBook),
    ("docs.python.org", Framework::Sphinx),
    ("www.sphinx-doc.org", Framework::Sphinx),
];

/// Lookup table of site configs by hostname and framework
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    hosts: HashMap<String, SiteConfig>,
    frameworks: HashMap<Framework, SiteConfig>,
    default: SiteConfig,
}

impl Default for SiteRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SiteRegistry {
    /// The built-in table
    pub fn builtin() -> Self {
        let frameworks: HashMap<Framework, SiteConfig> = Framework::ALL
            .iter()
            .map(|f| (*f, SiteConfig::for_framework(*f)))
            .collect();

        let hosts = BUILTIN_HOSTS
            .iter()
            .map(|(host, f)| (host.to_string(), SiteConfig::for_framework(*f)))
            .collect();

        Self {
            hosts,
            frameworks,
            default: SiteConfig::generic(),
        }
    }

    /// The built-in table extended with entries from a config file
    ///
    /// Entries override built-in hosts of the same name.
    pub fn with_entries(entries: &[SiteEntry]) -> Self {
        let mut registry = Self::builtin();
        for entry in entries {
            registry
                .hosts
                .insert(entry.host.to_ascii_lowercase(), entry.to_site_config());
        }
        registry
    }

    /// Config for an exact hostname, if one is known
    pub fn lookup_host(&self, host: &str) -> Option<&SiteConfig> {
        self.hosts.get(&host.to_ascii_lowercase())
    }

    /// Config for a hostname, falling back to the generic default
    pub fn lookup(&self, host: &str) -> &SiteConfig {
        self.lookup_host(host).unwrap_or(&self.default)
    }

    pub fn lookup_framework(&self, framework: Framework) -> Option<&SiteConfig> {
        self.frameworks.get(&framework)
    }

    pub fn default_config(&self) -> &SiteConfig {
        &self.default
    }

    /// Selects the config for a rendered page
    ///
    /// Hosts in the table win. Otherwise the rendered document is scored against the
    /// known frameworks and the best match at or above [`DETECTION_THRESHOLD`] is used.
    pub fn select(&self, host: &str, html: &str) -> &SiteConfig {
        if let Some(config) = self.lookup_host(host) {
            return config;
        }

        match detect_framework(html) {
            Some((framework, score)) => {
                tracing::debug!("Detected {} (score {:.2}) on {}", framework, score, host);
                self.lookup_framework(framework).unwrap_or(&self.default)
            }
            None => &self.default,
        }
    }
}

/// Scores one framework against a document, normalized to `[0, 1]`
pub fn framework_score(framework: Framework, document: &Html, raw: &str) -> f64 {
    let mut score = 0.0;

    for marker in framework.marker_selectors() {
        if let Ok(selector) = Selector::parse(marker) {
            if document.select(&selector).next().is_some() {
                score += SELECTOR_WEIGHT;
            }
        }
    }

    for pattern in framework.marker_patterns() {
        if let Ok(re) = Regex::new(pattern) {
            if re.is_match(raw) {
                score += PATTERN_WEIGHT;
            }
        }
    }

    (score / SCORE_DENOMINATOR).min(1.0)
}

/// Detects the documentation framework of a rendered page
///
/// Returns the best-scoring framework when its score reaches [`DETECTION_THRESHOLD`].
pub fn detect_framework(html: &str) -> Option<(Framework, f64)> {
    let document = Html::parse_document(html);

    let mut best: Option<(Framework, f64)> = None;
    for framework in Framework::ALL {
        let score = framework_score(framework, &document, html);
        let better = match best {
            Some((_, current)) => score > current,
            None => true,
        };
        if better {
            best = Some((framework, score));
        }
    }

    best.filter(|(_, score)| *score >= DETECTION_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_host() {
        let registry = SiteRegistry::builtin();
        let config = registry.lookup("docs.python.org");
        assert_eq!(config.framework, Some(Framework::Sphinx));
    }

    #[test]
    fn test_lookup_unknown_host_uses_default() {
        let registry = SiteRegistry::builtin();
        assert!(registry.lookup_host("unknown.example.com").is_none());
        assert_eq!(registry.lookup("unknown.example.com"), registry.default_config());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = SiteRegistry::builtin();
        assert!(registry.lookup_host("Docs.Python.org").is_some());
    }

    #[test]
    fn test_every_framework_has_config() {
        let registry = SiteRegistry::builtin();
        for framework in Framework::ALL {
            let config = registry.lookup_framework(framework).unwrap();
            assert_eq!(config.framework, Some(framework));
            assert!(!config.content_selector.is_empty());
        }
    }

    #[test]
    fn test_entries_override_builtin() {
        let entries = vec![SiteEntry {
            host: "docs.python.org".to_string(),
            content_selector: "#main".to_string(),
            remove_selectors: vec![],
            wait_for_selector: None,
            framework: None,
        }];
        let registry = SiteRegistry::with_entries(&entries);
        assert_eq!(registry.lookup("docs.python.org").content_selector, "#main");
    }

    #[test]
    fn test_detect_docusaurus() {
        let html = r#"<html><head><meta name="generator" content="Docusaurus v3"></head>
            <body><div id="__docusaurus"><nav class="navbar"></nav>
            <article><div class="theme-doc-markdown"><h1>Intro</h1></div></article></div></body></html>"#;
        let (framework, score) = detect_framework(html).unwrap();
        assert_eq!(framework, Framework::Docusaurus);
        assert!((score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_selector_reaches_threshold() {
        // One marker selector scores 10/30, just above the threshold
        let html = r#"<html><body><div class="md-content"><p>Text</p></div></body></html>"#;
        let (framework, score) = detect_framework(html).unwrap();
        assert_eq!(framework, Framework::MkDocs);
        assert!(score >= DETECTION_THRESHOLD);
    }

    #[test]
    fn test_single_pattern_below_threshold() {
        let html = "<html><body><p>Hosted on gitbook.io</p></body></html>";
        let document = Html::parse_document(html);
        let score = framework_score(Framework::GitBook, &document, html);
        assert!(score > 0.0);

        let html = "<html><body><p>plain page</p></body></html>";
        assert!(detect_framework(html).is_none());
    }

    #[test]
    fn test_select_prefers_host_table() {
        let registry = SiteRegistry::builtin();
        let html = r#"<div class="vp-doc"></div><div id="VPContent"></div>"#;
        let config = registry.select("docs.python.org", html);
        assert_eq!(config.framework, Some(Framework::Sphinx));

        let config = registry.select("unknown.example.com", html);
        assert_eq!(config.framework, Some(Framework::VitePress));
    }
}
