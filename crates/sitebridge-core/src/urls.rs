//! Site URL helpers.
//!
//! Partner URLs arrive from configuration and from payloads, so they are
//! checked for basic syntax before anything redirects to or posts at them.

use url::{form_urlencoded, Url};

/// Returns true if `candidate` is an absolute `http`/`https` URL with a host.
#[must_use]
pub fn is_valid_site_url(candidate: &str) -> bool {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return false;
    }
    match Url::parse(trimmed) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

/// Drops everything from the first `?` onwards.
#[must_use]
pub fn strip_query(url: &str) -> &str {
    let trimmed = url.trim();
    trimmed.split_once('?').map_or(trimmed, |(base, _)| base)
}

/// Joins a site base URL and an absolute path without doubling slashes.
#[must_use]
pub fn join_path(base: &str, path: &str) -> String {
    let base = base.trim().trim_end_matches('/');
    let path = path.trim();
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Appends form-encoded query pairs, continuing an existing query string if present.
#[must_use]
pub fn append_query<'a, I>(url: &str, pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    if encoded.is_empty() {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_site_urls() {
        assert!(is_valid_site_url("https://shop.example.com"));
        assert!(is_valid_site_url("http://localhost:8080/wp"));
        assert!(is_valid_site_url("  https://shop.example.com/?a=b  "));
    }

    #[test]
    fn test_invalid_site_urls() {
        assert!(!is_valid_site_url(""));
        assert!(!is_valid_site_url("shop.example.com"));
        assert!(!is_valid_site_url("javascript:alert(1)"));
        assert!(!is_valid_site_url("ftp://files.example.com"));
        assert!(!is_valid_site_url("/relative/path"));
    }

    #[test]
    fn test_strip_query() {
        assert_eq!(
            strip_query("https://shop.example.com/wp?lang=en&x=1"),
            "https://shop.example.com/wp"
        );
        assert_eq!(strip_query("https://shop.example.com"), "https://shop.example.com");
    }

    #[test]
    fn test_join_path() {
        assert_eq!(
            join_path("https://a.example.com/", "/auth/sso/login"),
            "https://a.example.com/auth/sso/login"
        );
        assert_eq!(
            join_path("https://a.example.com", "auth/sso/login"),
            "https://a.example.com/auth/sso/login"
        );
    }

    #[test]
    fn test_append_query_new_and_existing() {
        assert_eq!(
            append_query("https://a.example.com/", [("login_id", "5")]),
            "https://a.example.com/?login_id=5"
        );
        assert_eq!(
            append_query("https://a.example.com/?x=1", [("e", "a b")]),
            "https://a.example.com/?x=1&e=a+b"
        );
        assert_eq!(append_query("https://a.example.com/", []), "https://a.example.com/");
    }
}
