use url::Url;

/// Normalizes an href found in page markup into a crawlable absolute URL
///
/// # Normalization Steps
///
/// 1. Reject empty and fragment-only hrefs
/// 2. Resolve relative hrefs against `base_url`
/// 3. Reject absolute hrefs that do not share the base URL prefix (external
///    links, sibling sites on the same host are still accepted when the
///    textual prefix matches)
/// 4. Strip the `#fragment` suffix
/// 5. Strip the trailing slash
///
/// # Arguments
///
/// * `href` - The raw href attribute value
/// * `base_url` - The crawl's base URL
///
/// # Returns
///
/// * `Some(String)` - Normalized absolute URL
/// * `None` - The href should not be crawled
///
/// # Examples
///
/// ```
/// use url::Url;
/// use docbinder::url::normalize;
///
/// let base = Url::parse("https://docs.example.com/handbook/").unwrap();
/// assert_eq!(
///     normalize("getting-started/", &base).as_deref(),
///     Some("https://docs.example.com/handbook/getting-started")
/// );
/// assert_eq!(normalize("#section", &base), None);
/// assert_eq!(normalize("https://other.com/page", &base), None);
/// ```
pub fn normalize(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let base_prefix = base_url.as_str().trim_end_matches('/');

    let full_url = match Url::parse(href) {
        // Absolute URL: accept only when it stays under the base prefix
        Ok(absolute) => {
            if absolute.cannot_be_a_base() {
                return None;
            }
            if !href.starts_with(base_prefix) {
                return None;
            }
            absolute
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => base_url.join(href).ok()?,
        Err(_) => return None,
    };

    if full_url.scheme() != "http" && full_url.scheme() != "https" {
        return None;
    }

    // Strip fragment, then trailing slash
    let mut normalized = full_url;
    normalized.set_fragment(None);
    Some(normalized.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://docs.example.com/handbook/").unwrap()
    }

    #[test]
    fn test_empty_href() {
        assert_eq!(normalize("", &base()), None);
        assert_eq!(normalize("   ", &base()), None);
    }

    #[test]
    fn test_fragment_only() {
        assert_eq!(normalize("#introduction", &base()), None);
    }

    #[test]
    fn test_relative_href_resolved() {
        assert_eq!(
            normalize("getting-started", &base()).as_deref(),
            Some("https://docs.example.com/handbook/getting-started")
        );
    }

    #[test]
    fn test_root_relative_href_resolved() {
        assert_eq!(
            normalize("/handbook/faq", &base()).as_deref(),
            Some("https://docs.example.com/handbook/faq")
        );
    }

    #[test]
    fn test_absolute_under_base_accepted() {
        assert_eq!(
            normalize("https://docs.example.com/handbook/guide", &base()).as_deref(),
            Some("https://docs.example.com/handbook/guide")
        );
    }

    #[test]
    fn test_external_rejected() {
        assert_eq!(normalize("https://other.com/page", &base()), None);
    }

    #[test]
    fn test_same_host_outside_base_rejected() {
        assert_eq!(normalize("https://docs.example.com/blog/post", &base()), None);
    }

    #[test]
    fn test_fragment_stripped() {
        assert_eq!(
            normalize("guide#section-2", &base()).as_deref(),
            Some("https://docs.example.com/handbook/guide")
        );
    }

    #[test]
    fn test_trailing_slash_stripped() {
        assert_eq!(
            normalize("guide/", &base()).as_deref(),
            Some("https://docs.example.com/handbook/guide")
        );
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        assert_eq!(normalize("ftp://docs.example.com/handbook/file", &base()), None);
        assert_eq!(normalize("javascript:void(0)", &base()), None);
    }

    #[test]
    fn test_idempotent_for_accepted_urls() {
        // Re-normalizing an accepted URL yields the same result
        let first = normalize("guide/#anchor", &base()).unwrap();
        let second = normalize(&first, &base()).unwrap();
        assert_eq!(first, second);
    }
}
