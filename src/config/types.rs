use crate::extract::{Framework, SiteConfig};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// How the crawl frontier is populated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CrawlMode {
    /// Breadth-first traversal of links found in fetched pages
    #[default]
    Links,
    /// Every URL listed by the site's sitemap
    Sitemap,
}

/// Identifies one content adapter, used to force a single acquisition strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    /// Markdown via content negotiation on the page URL
    Endpoint,
    /// Raw Markdown/MDX source at a sibling `.md` path
    Mdx,
    /// External reader API
    Jina,
    /// Headless browser rendering
    Rendering,
}

impl AdapterKind {
    /// Name reported in outcomes and logs for this adapter
    pub fn name(&self) -> &'static str {
        match self {
            Self::Endpoint => "endpoint",
            Self::Mdx => "mdx",
            Self::Jina => "jina",
            Self::Rendering => "rendering",
        }
    }
}

/// Options for a single crawl invocation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Root directory of the Markdown mirror
    pub out_dir: PathBuf,

    /// Link-following or sitemap enumeration
    pub mode: CrawlMode,

    /// Maximum link depth from the entry page (link mode only)
    pub max_depth: u32,

    /// Maximum number of pages processed at once
    pub concurrency: usize,

    /// Prefix file names with a per-directory sequence number
    pub numbered: bool,

    /// Use exactly this adapter instead of the fallback chain
    pub forced_adapter: Option<AdapterKind>,

    /// Allow the external reader API in the chain
    pub use_jina: bool,

    /// Log every page outcome at info level
    pub verbose: bool,

    /// Bound on HTTP requests and browser navigation (seconds)
    pub page_timeout_secs: u64,

    /// Bound on waiting for the content-ready selector (seconds)
    pub selector_timeout_secs: u64,

    /// User agent sent by the HTTP adapters and the sitemap reader
    pub user_agent: String,

    /// Site configurations added to the built-in table
    pub sites: Vec<SiteEntry>,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("output"),
            mode: CrawlMode::Links,
            max_depth: 2,
            concurrency: 3,
            numbered: false,
            forced_adapter: None,
            use_jina: false,
            verbose: false,
            page_timeout_secs: 30,
            selector_timeout_secs: 10,
            user_agent: format!("docmirror/{}", env!("CARGO_PKG_VERSION")),
            sites: Vec::new(),
        }
    }
}

impl CrawlOptions {
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn selector_timeout(&self) -> Duration {
        Duration::from_secs(self.selector_timeout_secs)
    }
}

/// Contents of a TOML configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub crawl: CrawlSection,

    #[serde(default, rename = "site")]
    pub sites: Vec<SiteEntry>,
}

impl FileConfig {
    /// Copies every value set in the file onto the options
    pub fn apply_to(&self, options: &mut CrawlOptions) {
        let crawl = &self.crawl;
        if let Some(out_dir) = &crawl.out_dir {
            options.out_dir = out_dir.clone();
        }
        if let Some(mode) = crawl.mode {
            options.mode = mode;
        }
        if let Some(max_depth) = crawl.max_depth {
            options.max_depth = max_depth;
        }
        if let Some(concurrency) = crawl.concurrency {
            options.concurrency = concurrency;
        }
        if let Some(numbered) = crawl.numbered {
            options.numbered = numbered;
        }
        if let Some(adapter) = crawl.forced_adapter {
            options.forced_adapter = Some(adapter);
        }
        if let Some(use_jina) = crawl.use_jina {
            options.use_jina = use_jina;
        }
        if let Some(secs) = crawl.page_timeout_secs {
            options.page_timeout_secs = secs;
        }
        if let Some(secs) = crawl.selector_timeout_secs {
            options.selector_timeout_secs = secs;
        }
        if let Some(user_agent) = &crawl.user_agent {
            options.user_agent = user_agent.clone();
        }
        options.sites.extend(self.sites.iter().cloned());
    }
}

/// The `[crawl]` table; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrawlSection {
    #[serde(rename = "out-dir")]
    pub out_dir: Option<PathBuf>,

    pub mode: Option<CrawlMode>,

    #[serde(rename = "max-depth")]
    pub max_depth: Option<u32>,

    pub concurrency: Option<usize>,

    pub numbered: Option<bool>,

    #[serde(rename = "forced-adapter")]
    pub forced_adapter: Option<AdapterKind>,

    #[serde(rename = "use-jina")]
    pub use_jina: Option<bool>,

    #[serde(rename = "page-timeout-secs")]
    pub page_timeout_secs: Option<u64>,

    #[serde(rename = "selector-timeout-secs")]
    pub selector_timeout_secs: Option<u64>,

    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,
}

/// A `[[site]]` entry describing where content lives on one host
#[derive(Debug, Clone, Deserialize)]
pub struct SiteEntry {
    /// Exact hostname (e.g., "docs.example.com")
    pub host: String,

    /// CSS selector of the content region
    #[serde(rename = "content-selector")]
    pub content_selector: String,

    /// CSS selectors of elements removed before conversion
    #[serde(rename = "remove-selectors", default)]
    pub remove_selectors: Vec<String>,

    /// CSS selector that signals the content has rendered
    #[serde(rename = "wait-for-selector")]
    pub wait_for_selector: Option<String>,

    /// Documentation framework the site is built with
    pub framework: Option<Framework>,
}

impl SiteEntry {
    /// Converts the entry into the lookup-table form
    pub fn to_site_config(&self) -> SiteConfig {
        SiteConfig {
            content_selector: self.content_selector.clone(),
            remove_selectors: self.remove_selectors.clone(),
            wait_for_selector: self.wait_for_selector.clone(),
            framework: self.framework,
        }
    }
}
