/// Per-page outcome definitions for a crawl invocation
///
/// Every URL processed by a crawl ends in exactly one outcome, and outcomes never move
/// between categories once recorded.
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;

/// Why fetched content was judged not genuine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockReason {
    /// Nothing left after cleanup
    Empty,

    /// Cloudflare challenge or block page
    Cloudflare,

    /// Short "access denied" / forbidden page
    AccessDenied,

    /// Generic bot challenge ("just a moment", captcha, ...)
    BotDetection,

    /// Reported as blocked without a recognizable signature
    Unknown,
}

impl BlockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Cloudflare => "cloudflare",
            Self::AccessDenied => "access_denied",
            Self::BotDetection => "bot_detection",
            Self::Unknown => "unknown",
        }
    }

    /// Human readable description used in reports
    pub fn description(&self) -> &'static str {
        match self {
            Self::Empty => "empty content",
            Self::Cloudflare => "Cloudflare challenge",
            Self::AccessDenied => "access denied",
            Self::BotDetection => "bot detection",
            Self::Unknown => "blocked",
        }
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final result for one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Markdown written to `local_path` by `adapter`
    Saved {
        url: String,
        local_path: PathBuf,
        adapter: String,
    },

    /// Content was a challenge page or empty
    Blocked { url: String, reason: BlockReason },

    /// Any other fetch or write error
    Failed { url: String, message: String },
}

impl Outcome {
    pub fn url(&self) -> &str {
        match self {
            Self::Saved { url, .. } | Self::Blocked { url, .. } | Self::Failed { url, .. } => url,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Saved {
                url,
                local_path,
                adapter,
            } => write!(f, "saved {} -> {} ({})", url, local_path.display(), adapter),
            Self::Blocked { url, reason } => write!(f, "blocked {} ({})", url, reason),
            Self::Failed { url, message } => write!(f, "failed {}: {}", url, message),
        }
    }
}

/// Aggregated outcomes of one crawl invocation
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub entry_url: String,
    pub saved: Vec<Outcome>,
    pub blocked: Vec<Outcome>,
    pub failed: Vec<Outcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl CrawlReport {
    pub fn new(entry_url: impl Into<String>) -> Self {
        Self {
            entry_url: entry_url.into(),
            saved: Vec::new(),
            blocked: Vec::new(),
            failed: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Files an outcome into its category
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Saved { .. } => self.saved.push(outcome),
            Outcome::Blocked { .. } => self.blocked.push(outcome),
            Outcome::Failed { .. } => self.failed.push(outcome),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn total(&self) -> usize {
        self.saved.len() + self.blocked.len() + self.failed.len()
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Percentage of processed URLs that were saved
    pub fn success_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.saved.len() as f64 / total as f64) * 100.0
        }
    }

    /// Number of saved pages per adapter name, sorted by name
    pub fn saved_by_adapter(&self) -> Vec<(String, usize)> {
        let mut counts: std::collections::BTreeMap<String, usize> = Default::default();
        for outcome in &self.saved {
            if let Outcome::Saved { adapter, .. } = outcome {
                *counts.entry(adapter.clone()).or_default() += 1;
            }
        }
        counts.into_iter().collect()
    }
}
