use crate::config::types::{CrawlOptions, FileConfig, SiteEntry};
use crate::ConfigError;

/// Largest accepted concurrency bound
pub const MAX_CONCURRENCY: usize = 64;

/// Validates the options of a crawl invocation
pub fn validate_options(options: &CrawlOptions) -> Result<(), ConfigError> {
    if options.concurrency < 1 || options.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, options.concurrency
        )));
    }

    if options.page_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "page_timeout_secs must be greater than 0".to_string(),
        ));
    }

    if options.selector_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "selector_timeout_secs must be greater than 0".to_string(),
        ));
    }

    if options.out_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "out_dir cannot be empty".to_string(),
        ));
    }

    if options.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    validate_sites(&options.sites)
}

/// Validates a parsed configuration file
pub fn validate_file(config: &FileConfig) -> Result<(), ConfigError> {
    if let Some(concurrency) = config.crawl.concurrency {
        if concurrency < 1 || concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::Validation(format!(
                "concurrency must be between 1 and {}, got {}",
                MAX_CONCURRENCY, concurrency
            )));
        }
    }

    validate_sites(&config.sites)
}

/// Validates `[[site]]` entries
fn validate_sites(sites: &[SiteEntry]) -> Result<(), ConfigError> {
    for entry in sites {
        validate_host_pattern(&entry.host)?;

        if entry.content_selector.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "Site '{}' must have a non-empty content-selector",
                entry.host
            )));
        }

        if entry.remove_selectors.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "Site '{}' has an empty remove-selector",
                entry.host
            )));
        }

        if let Some(wait) = &entry.wait_for_selector {
            if wait.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "Site '{}' has an empty wait-for-selector",
                    entry.host
                )));
            }
        }
    }

    Ok(())
}

/// Validates a host pattern (an optional `*.` prefix is allowed)
pub fn validate_host_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Host pattern cannot be empty".to_string(),
        ));
    }

    let host = pattern.strip_prefix("*.").unwrap_or(pattern);
    validate_host_string(host)
}

/// Validates a host string (without wildcard prefix)
fn validate_host_string(host: &str) -> Result<(), ConfigError> {
    if host.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Host cannot be empty".to_string(),
        ));
    }

    // Check for invalid characters
    if !host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' contains invalid characters",
            host
        )));
    }

    if host.starts_with('.') || host.ends_with('.') || host.starts_with('-') || host.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' cannot start or end with '.' or '-'",
            host
        )));
    }

    if host.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' cannot contain consecutive dots",
            host
        )));
    }

    // Single-label hosts other than localhost are almost always typos
    if !host.contains('.') && host != "localhost" {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' must contain at least one dot (e.g., 'docs.example.com')",
            host
        )));
    }

    Ok(())
}
