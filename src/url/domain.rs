use url::Url;

/// Extracts the lowercase host from a URL
///
/// Returns None if the URL has no host (which shouldn't happen for valid
/// HTTP(S) URLs).
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks whether two URLs point at the same site
///
/// Hosts are compared case-insensitively with any leading `www.` stripped
/// from both sides, so `https://www.example.com` and `https://example.com`
/// count as the same domain.
pub fn same_domain(a: &Url, b: &Url) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(da), Some(db)) => strip_www(&da) == strip_www(&db),
        _ => false,
    }
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}
