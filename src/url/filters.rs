//! Crawl-boundary filters
//!
//! Heuristics that keep one crawl inside one logical document: skipping
//! binary assets, refusing to wander into a second documentation version
//! tree, and refusing to cross between unrelated documentation sections.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Substrings that mark a URL as unfetchable or out of scope
const SKIP_PATTERNS: &[&str] = &[
    "mailto:", "tel:", ".pdf", ".jpg", ".png", ".gif", ".svg", "api-docs",
];

/// Named release-channel tokens treated as version path segments
const VERSION_CHANNELS: &[&str] = &[
    "nightly", "canary", "next", "latest", "testnet", "stable", "beta", "alpha", "dev", "staging",
    "main", "master", "trunk", "edge", "unstable",
];

/// Documentation-section keywords used to detect cross-section links
const SECTION_KEYWORDS: &[&str] = &[
    "developers",
    "operators",
    "validators",
    "nodes",
    "guides",
    "tutorials",
    "api",
    "reference",
    "learn",
    "build",
    "sdk",
    "cli",
    "concepts",
    "integrations",
];

/// Matches numeric semver-style segments (`v2`, `v1.2.3`) and `rc`/`rc1`
static SEMVER_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)(v\d+(\.\d+)*|rc\d*)$").expect("valid regex"));

/// Returns true for URLs that should never be fetched
///
/// Matches mail/phone schemes, common binary asset extensions and the
/// `api-docs` exclusion token anywhere in the URL.
pub fn should_skip(url: &str) -> bool {
    SKIP_PATTERNS.iter().any(|pattern| url.contains(pattern))
}

/// Returns the non-empty path segments of a URL string
///
/// Unparseable URLs yield an empty segment list, which makes the filters
/// below conservative (nothing is skipped for garbage input).
fn path_segments(url: &str) -> Vec<String> {
    match Url::parse(url) {
        Ok(parsed) => parsed
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Checks whether a path segment looks like a documentation version
///
/// Matches numeric semver segments (`v1`, `v2.0`, `v1.2.3`), `rc`/`rcN` and a
/// fixed vocabulary of release-channel names. The whole segment must match:
/// `canaries`, `nextjs` and `mainframe` are not versions.
fn is_version_segment(segment: &str) -> bool {
    if SEMVER_SEGMENT.is_match(segment) {
        return true;
    }
    let lower = segment.to_lowercase();
    VERSION_CHANNELS.contains(&lower.as_str())
}

fn has_version_segment(url: &str) -> bool {
    path_segments(url).iter().any(|s| is_version_segment(s))
}

/// Detects links that cross into a different documentation version tree
///
/// True iff exactly one of {`url`, `base_url`} carries a version-looking path
/// segment. When both carry one the link stays within the same version
/// context; when neither does there is nothing to separate.
pub fn is_different_version_path(url: &str, base_url: &str) -> bool {
    has_version_segment(url) != has_version_segment(base_url)
}

/// Detects links that cross between unrelated documentation sections
///
/// A crawl rooted at `/developers/` must not wander into an `/operators/`
/// tree on multi-section sites. True when both paths carry a section keyword
/// and the keywords differ, or when the URL introduces a section keyword at a
/// level deeper than the (non-root) base path specifies.
pub fn is_different_doc_section(url: &str, base_url: &str) -> bool {
    let base_segments = path_segments(base_url);
    let url_segments = path_segments(url);

    let base_keywords: Vec<String> = base_segments
        .iter()
        .map(|s| s.to_lowercase())
        .filter(|s| SECTION_KEYWORDS.contains(&s.as_str()))
        .collect();

    for (i, segment) in url_segments.iter().enumerate() {
        let lower = segment.to_lowercase();
        if !SECTION_KEYWORDS.contains(&lower.as_str()) {
            continue;
        }
        // Same section context as the base: fine
        if base_keywords.contains(&lower) {
            continue;
        }
        // Base is rooted in some section and this link names another
        if !base_keywords.is_empty() {
            return true;
        }
        // Base has no section but the link branches into one below it
        if !base_segments.is_empty() && i >= base_segments.len() {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_skip_mailto() {
        assert!(should_skip("mailto:docs@example.com"));
    }

    #[test]
    fn test_should_skip_assets() {
        assert!(should_skip("https://x/logo.png"));
        assert!(should_skip("https://x/whitepaper.pdf"));
        assert!(should_skip("https://x/icon.svg"));
    }

    #[test]
    fn test_should_skip_api_docs_token() {
        assert!(should_skip("https://x/api-docs/v1"));
    }

    #[test]
    fn test_should_not_skip_regular_page() {
        assert!(!should_skip("https://x/guide/images-overview"));
    }

    // Version path detection

    #[test]
    fn test_no_version_patterns() {
        assert!(!is_different_version_path(
            "https://docs.example.com/guide",
            "https://docs.example.com/"
        ));
    }

    #[test]
    fn test_url_has_version_base_does_not() {
        assert!(is_different_version_path(
            "https://docs.example.com/v2/guide",
            "https://docs.example.com/"
        ));
    }

    #[test]
    fn test_base_has_version_url_does_not() {
        assert!(is_different_version_path(
            "https://docs.example.com/guide",
            "https://docs.example.com/nightly/"
        ));
    }

    #[test]
    fn test_both_have_version_patterns() {
        assert!(!is_different_version_path(
            "https://docs.example.com/v2/guide",
            "https://docs.example.com/v1/"
        ));
    }

    #[test]
    fn test_reflexive_is_false() {
        for u in [
            "https://docs.example.com/",
            "https://docs.example.com/v2/guide",
            "https://docs.example.com/nightly/x",
        ] {
            assert!(!is_different_version_path(u, u), "failed for {}", u);
        }
    }

    #[test]
    fn test_semver_segments() {
        for path in ["v1", "v2.0", "v1.2.3", "V2"] {
            let url = format!("https://docs.example.com/{}/guide", path);
            assert!(
                is_different_version_path(&url, "https://docs.example.com/"),
                "failed for {}",
                path
            );
        }
    }

    #[test]
    fn test_named_channels() {
        for channel in [
            "nightly", "canary", "next", "latest", "testnet", "stable", "beta", "alpha", "rc",
            "rc1", "dev", "staging", "main", "master", "trunk", "edge", "unstable", "NIGHTLY",
        ] {
            let url = format!("https://docs.example.com/{}/guide", channel);
            assert!(
                is_different_version_path(&url, "https://docs.example.com/"),
                "failed for {}",
                channel
            );
        }
    }

    #[test]
    fn test_whole_segment_matching_no_false_positives() {
        for segment in [
            "canaries",
            "nextjs",
            "latest-archive",
            "development-docs",
            "mainframe",
            "masterclass",
        ] {
            let url = format!("https://docs.example.com/{}/guide", segment);
            assert!(
                !is_different_version_path(&url, "https://docs.example.com/"),
                "false positive for {}",
                segment
            );
        }
    }

    #[test]
    fn test_version_at_end_of_path() {
        assert!(is_different_version_path(
            "https://docs.example.com/docs/v2",
            "https://docs.example.com/"
        ));
    }

    #[test]
    fn test_deeply_nested_version() {
        assert!(is_different_version_path(
            "https://docs.example.com/api/docs/v2/reference",
            "https://docs.example.com/"
        ));
    }

    // Doc section detection

    #[test]
    fn test_different_sections() {
        assert!(is_different_doc_section(
            "https://docs.example.com/operators/setup",
            "https://docs.example.com/developers/"
        ));
    }

    #[test]
    fn test_same_section() {
        assert!(!is_different_doc_section(
            "https://docs.example.com/developers/quickstart",
            "https://docs.example.com/developers/"
        ));
    }

    #[test]
    fn test_section_introduced_below_base() {
        assert!(is_different_doc_section(
            "https://docs.example.com/handbook/api/endpoints",
            "https://docs.example.com/handbook/"
        ));
    }

    #[test]
    fn test_no_sections_anywhere() {
        assert!(!is_different_doc_section(
            "https://docs.example.com/handbook/intro",
            "https://docs.example.com/handbook/"
        ));
    }

    #[test]
    fn test_root_base_does_not_fence_sections() {
        // A crawl rooted at the site root may enter any section
        assert!(!is_different_doc_section(
            "https://docs.example.com/guides/intro",
            "https://docs.example.com/"
        ));
    }

    #[test]
    fn test_url_without_section_from_sectioned_base() {
        assert!(!is_different_doc_section(
            "https://docs.example.com/developers/faq",
            "https://docs.example.com/developers/"
        ));
    }
}
