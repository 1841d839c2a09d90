//! docmirror main entry point
//!
//! This is the command-line interface for mirroring documentation sites as Markdown.

use anyhow::Context;
use clap::Parser;
use docmirror::config::load_config_with_hash;
use docmirror::output::{print_report, write_markdown_summary};
use docmirror::{crawl, AdapterKind, CrawlMode, CrawlOptions};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// docmirror: mirror a documentation site as Markdown
///
/// docmirror crawls a documentation site by following links or by reading its sitemap,
/// converts every page to Markdown, and writes the pages into a directory tree that
/// mirrors the site's URL hierarchy.
#[derive(Parser, Debug)]
#[command(name = "docmirror")]
#[command(version)]
#[command(about = "Mirror a documentation site as Markdown", long_about = None)]
struct Cli {
    /// Entry URL of the documentation site
    #[arg(value_name = "URL")]
    url: String,

    /// Output directory for the Markdown mirror
    #[arg(short, long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// How pages are discovered
    #[arg(short, long, value_enum)]
    mode: Option<CrawlMode>,

    /// Maximum link depth from the entry page
    #[arg(short, long)]
    depth: Option<u32>,

    /// Pages processed at once
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Prefix file names with per-directory sequence numbers
    #[arg(short, long)]
    numbered: bool,

    /// Use only this adapter instead of the fallback chain
    #[arg(short, long, value_enum)]
    adapter: Option<AdapterKind>,

    /// Allow the Jina reader API as a fallback (reads JINA_API_KEY)
    #[arg(long)]
    jina: bool,

    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Write a Markdown summary of the run to this path
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,

    /// Print the effective options and exit without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut options = CrawlOptions::default();
    let mut config_hash = None;

    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
        let (file, hash) = load_config_with_hash(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?;
        tracing::info!("Configuration loaded successfully (hash: {})", hash);
        file.apply_to(&mut options);
        config_hash = Some(hash);
    }

    apply_cli(&cli, &mut options);

    if cli.dry_run {
        print_dry_run(&cli.url, &options);
        return Ok(());
    }

    let report = crawl(&cli.url, options)
        .await
        .with_context(|| format!("crawl of {} failed", cli.url))?;

    if !cli.quiet {
        print_report(&report);
    }

    if let Some(path) = &cli.summary {
        write_markdown_summary(&report, config_hash.as_deref(), path)
            .with_context(|| format!("failed to write summary {}", path.display()))?;
        tracing::info!("Summary written to {}", path.display());
    }

    Ok(())
}

/// Copies flags given on the command line over file and default values
fn apply_cli(cli: &Cli, options: &mut CrawlOptions) {
    if let Some(out) = &cli.out {
        options.out_dir = out.clone();
    }
    if let Some(mode) = cli.mode {
        options.mode = mode;
    }
    if let Some(depth) = cli.depth {
        options.max_depth = depth;
    }
    if let Some(concurrency) = cli.concurrency {
        options.concurrency = concurrency;
    }
    if cli.numbered {
        options.numbered = true;
    }
    if let Some(adapter) = cli.adapter {
        options.forced_adapter = Some(adapter);
    }
    if cli.jina {
        options.use_jina = true;
    }
    if cli.verbose > 0 {
        options.verbose = true;
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("docmirror=info,warn"),
            1 => EnvFilter::new("docmirror=debug,info"),
            2 => EnvFilter::new("docmirror=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn print_dry_run(url: &str, options: &CrawlOptions) {
    println!("=== docmirror Dry Run ===\n");

    println!("Entry URL: {}", url);
    println!("Output directory: {}", options.out_dir.display());
    println!("Mode: {:?}", options.mode);
    println!("Max depth: {}", options.max_depth);
    println!("Concurrency: {}", options.concurrency);
    println!("Numbered: {}", options.numbered);
    match options.forced_adapter {
        Some(kind) => println!("Adapter: {} (forced)", kind.name()),
        None => println!(
            "Adapters: endpoint, mdx, {}rendering",
            if options.use_jina { "jina, " } else { "" }
        ),
    }
    println!(
        "Timeouts: page {}s, selector {}s",
        options.page_timeout_secs, options.selector_timeout_secs
    );
    println!("User agent: {}", options.user_agent);

    if !options.sites.is_empty() {
        println!("\nSite Configurations ({}):", options.sites.len());
        for site in &options.sites {
            println!("  - {} ({})", site.host, site.content_selector);
        }
    }

    match docmirror::config::validate_options(options) {
        Ok(()) => println!("\n✓ Options are valid"),
        Err(e) => println!("\n✗ {}", e),
    }
}
