//! Classification of fetched content that is not a genuine page
//!
//! Anti-bot interstitials usually arrive with a 200 status. They are recognized by
//! their text, and short pages are treated with more suspicion than long ones.

use crate::state::BlockReason;
use regex::Regex;
use std::sync::LazyLock;

/// Pages shorter than this may be Cloudflare interstitials
pub const CHALLENGE_MAX_LEN: usize = 1000;

/// Pages shorter than this may be access-denied pages
pub const ACCESS_DENIED_MAX_LEN: usize = 500;

/// Pages shorter than this may be bot challenges
pub const BOT_CHECK_MAX_LEN: usize = 100;

/// Challenge script and form identifiers, blocked at any length
const CLOUDFLARE_TOKENS: &[&str] = &["cf-browser-verification", "cf_chl_"];

/// Interstitial wording that documentation may also discuss
const CLOUDFLARE_PHRASES: &[&str] = &[
    "checking your browser",
    "attention required! | cloudflare",
    "challenge-platform",
    "enable javascript and cookies to continue",
    "cloudflare ray id",
];

const ACCESS_DENIED_MARKERS: &[&str] = &[
    "access denied",
    "403 forbidden",
    "you don't have permission",
    "you do not have permission",
    "request blocked",
];

const BOT_MARKERS: &[&str] = &[
    "just a moment",
    "verify you are human",
    "are you a robot",
    "captcha",
    "ddos protection",
    "please wait while we verify",
];

static READER_WARNING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Warning:\s*Target URL returned error (\d{3})").expect("valid regex")
});

/// Checks converted content and returns why it is not genuine
pub fn validate_content(content: &str) -> Result<(), BlockReason> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(BlockReason::Empty);
    }

    let lower = trimmed.to_lowercase();

    let len = trimmed.chars().count();

    if CLOUDFLARE_TOKENS.iter().any(|m| lower.contains(m))
        || (len < CHALLENGE_MAX_LEN && CLOUDFLARE_PHRASES.iter().any(|m| lower.contains(m)))
    {
        return Err(BlockReason::Cloudflare);
    }

    if len < ACCESS_DENIED_MAX_LEN && ACCESS_DENIED_MARKERS.iter().any(|m| lower.contains(m)) {
        return Err(BlockReason::AccessDenied);
    }

    if len < BOT_CHECK_MAX_LEN && BOT_MARKERS.iter().any(|m| lower.contains(m)) {
        return Err(BlockReason::BotDetection);
    }

    Ok(())
}

/// Maps a reader service warning about the target's status to a block reason
pub fn classify_reader_warning(content: &str) -> Option<BlockReason> {
    let caps = READER_WARNING_RE.captures(content)?;
    match &caps[1] {
        "403" => Some(BlockReason::AccessDenied),
        _ => Some(BlockReason::Unknown),
    }
}
