//! Generic link-harvesting fallback
//!
//! When no template family claims a page, or a claiming family found too
//! little, every same-origin anchor under the base URL becomes a candidate
//! page. Depth comes from counting path segments relative to the base, so a
//! direct child of the base sits at depth 0. Pagination anchors and
//! single-character icon links are skipped.

use std::collections::HashSet;

use scraper::Html;
use url::Url;

use crate::nav::walk::{element_text, ANCHOR};
use crate::nav::NavLink;
use crate::url::{normalize, should_skip};

const MAX_FALLBACK_DEPTH: usize = 4;
const PAGINATION_LABELS: &[&str] = &["previous", "next"];

pub(crate) fn extract(doc: &Html, base_url: &Url, seen: &mut HashSet<String>) -> Vec<NavLink> {
    let mut links = Vec::new();
    let base_prefix = base_url.as_str().trim_end_matches('/');
    let base_depth = segment_count(base_url.path());

    for anchor in doc.select(&ANCHOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(url) = normalize(href, base_url) else {
            continue;
        };
        if seen.contains(&url) || should_skip(&url) {
            continue;
        }
        // The base page itself is handled by the orchestrator, not the list
        if url == base_prefix {
            continue;
        }

        let text = element_text(anchor);
        if text.chars().count() <= 1 {
            continue;
        }
        if PAGINATION_LABELS.contains(&text.to_lowercase().as_str()) {
            continue;
        }

        let depth = Url::parse(&url)
            .map(|parsed| {
                segment_count(parsed.path())
                    .saturating_sub(base_depth)
                    .saturating_sub(1)
                    .min(MAX_FALLBACK_DEPTH)
            })
            .unwrap_or(0);

        seen.insert(url.clone());
        links.push(NavLink::page(url, text, depth));
    }

    links
}

fn segment_count(path: &str) -> usize {
    path.split('/').filter(|s| !s.is_empty()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://docs.example.com/handbook/").unwrap()
    }

    fn harvest(html: &str) -> Vec<NavLink> {
        let doc = Html::parse_document(html);
        let mut seen = HashSet::new();
        extract(&doc, &base(), &mut seen)
    }

    #[test]
    fn test_same_origin_links_harvested() {
        let links = harvest(
            r#"<a href="/handbook/intro">Intro</a>
               <a href="https://other.com/x">External</a>"#,
        );
        assert_eq!(links.len(), 1);
        assert_eq!(
            links[0].url.as_deref(),
            Some("https://docs.example.com/handbook/intro")
        );
    }

    #[test]
    fn test_base_url_itself_excluded() {
        let links = harvest(r#"<a href="/handbook/">Home page</a>"#);
        assert!(links.is_empty());
    }

    #[test]
    fn test_pagination_and_icon_links_skipped() {
        let links = harvest(
            r#"<a href="/handbook/a">Next</a>
               <a href="/handbook/b">→</a>
               <a href="/handbook/c">Real page</a>"#,
        );
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].title, "Real page");
    }

    #[test]
    fn test_depth_from_relative_segments() {
        let links = harvest(
            r#"<a href="/handbook/a">Top A</a>
               <a href="/handbook/a/b">Nested B</a>
               <a href="/handbook/a/b/c/d/e/f/g">Deep G</a>"#,
        );
        assert_eq!(links[0].depth, 0);
        assert_eq!(links[1].depth, 1);
        assert_eq!(links[2].depth, MAX_FALLBACK_DEPTH);
    }
}
