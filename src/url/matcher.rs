/// Checks if a host belongs to an allowlist entry
///
/// An entry matches the host itself and every subdomain of it. A leading `*.` on the
/// pattern is accepted and means the same thing, so config files may use either form.
///
/// # Examples
///
/// ```
/// use docmirror::url::host_matches;
///
/// assert!(host_matches("example.com", "example.com"));
/// assert!(host_matches("example.com", "docs.example.com"));
/// assert!(host_matches("*.example.com", "api.v2.example.com"));
/// assert!(!host_matches("example.com", "notexample.com"));
/// ```
pub fn host_matches(pattern: &str, host: &str) -> bool {
    let base = pattern.strip_prefix("*.").unwrap_or(pattern);
    if base.is_empty() || host.is_empty() {
        return false;
    }

    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let base = base.to_ascii_lowercase();
    host == base || host.ends_with(&format!(".{}", base))
}

/// Returns true if the host matches any entry of the allowlist
pub fn host_in_list<S: AsRef<str>>(list: &[S], host: &str) -> bool {
    list.iter().any(|pattern| host_matches(pattern.as_ref(), host))
}
