use crate::UrlError;
use url::Url;

/// Validates and normalizes a seed URL before any network call
///
/// A missing scheme is defaulted to `https://`; an explicit scheme is never
/// overridden. Only HTTP and HTTPS are accepted, and the URL must carry a
/// host.
///
/// # Examples
///
/// ```
/// use sitescout::url::normalize_seed;
///
/// let url = normalize_seed("example.com").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/");
///
/// let url = normalize_seed("http://example.com/about").unwrap();
/// assert_eq!(url.scheme(), "http");
/// ```
pub fn normalize_seed(raw: &str) -> Result<Url, UrlError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Parse("empty URL".to_string()));
    }

    // Default the scheme, but never override an explicit one.
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}
