//! Canonical form for target URLs.
//!
//! Deduplication and the phishing blocklist both compare normalized strings,
//! so every URL entering the store passes through [`normalize_url`] first.

use url::Url;

/// Longest accepted target URL, measured on the raw input.
pub const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum UrlNormalizationError {
    #[error("URL must not be empty")]
    Empty,

    #[error("URL exceeds {MAX_URL_LENGTH} characters")]
    TooLong,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL has no host")]
    MissingHost,
}

/// Normalizes an absolute http(s) URL.
///
/// The scheme and host are lowercased, the default port and the fragment are
/// dropped. Path and query keep their case.
///
/// ```ignore
/// assert_eq!(
///     normalize_url("HTTPS://Example.COM:443/Docs?q=1#intro").unwrap(),
///     "https://example.com/Docs?q=1"
/// );
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UrlNormalizationError::Empty);
    }
    if input.len() > MAX_URL_LENGTH {
        return Err(UrlNormalizationError::TooLong);
    }

    let mut url =
        Url::parse(input).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlNormalizationError::UnsupportedProtocol);
    }

    // The parser already lowercases registered domains; IP hosts keep their form.
    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlNormalizationError::MissingHost);
    }

    url.set_fragment(None);

    // `Url` reports `None` for a port equal to the scheme default.
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_form() {
        assert_eq!(
            normalize_url("HTTPS://Example.COM:443/Docs?q=Rust#intro").unwrap(),
            "https://example.com/Docs?q=Rust"
        );
        assert_eq!(
            normalize_url("http://example.com:80").unwrap(),
            "http://example.com/"
        );
    }

    #[test]
    fn test_equivalent_inputs_collapse() {
        let a = normalize_url("https://example.com/page").unwrap();
        let b = normalize_url("  https://EXAMPLE.com:443/page#top ").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_custom_port_kept() {
        assert_eq!(
            normalize_url("http://localhost:8080/api").unwrap(),
            "http://localhost:8080/api"
        );
    }

    #[test]
    fn test_rejects_other_schemes() {
        for input in [
            "ftp://example.com/file",
            "javascript:alert(1)",
            "mailto:someone@example.com",
            "file:///etc/passwd",
        ] {
            assert_eq!(
                normalize_url(input),
                Err(UrlNormalizationError::UnsupportedProtocol),
                "{input}"
            );
        }
    }

    #[test]
    fn test_rejects_relative_and_empty() {
        assert!(matches!(
            normalize_url("example.com/path"),
            Err(UrlNormalizationError::InvalidFormat(_))
        ));
        assert_eq!(normalize_url("   "), Err(UrlNormalizationError::Empty));
    }

    #[test]
    fn test_length_limit() {
        let at_limit = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH - 20));
        assert_eq!(at_limit.len(), MAX_URL_LENGTH);
        assert!(normalize_url(&at_limit).is_ok());

        let over = format!("{at_limit}a");
        assert_eq!(normalize_url(&over), Err(UrlNormalizationError::TooLong));
    }
}
