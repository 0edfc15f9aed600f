//! Shared DOM-walking helpers for the navigation strategies
//!
//! Most documentation templates express their sidebar as nested `ol`/`ul`
//! markup; `process_nav_list` is the common recursive walker that turns that
//! shape into a flat, depth-annotated [`NavLink`] list.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use url::Url;

use crate::nav::NavLink;
use crate::url::{normalize, should_skip};

pub(crate) static ANCHOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Collapses an element's text nodes into a single trimmed string
pub(crate) fn element_text(el: ElementRef) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Iterates the direct element children of `el`
pub(crate) fn child_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}

/// Returns true when the element carries the exact class token
pub(crate) fn has_class(el: ElementRef, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

/// Returns true when any class token contains the given substring
pub(crate) fn has_class_containing(el: ElementRef, fragment: &str) -> bool {
    el.value().classes().any(|c| c.contains(fragment))
}

/// The element's class tokens joined into one string, for pattern checks
pub(crate) fn class_string(el: ElementRef) -> String {
    el.value().classes().collect::<Vec<_>>().join(" ")
}

/// Appends a page link if it normalizes, is unseen and not skippable
///
/// Returns true when the link was accepted.
pub(crate) fn push_page_link(
    out: &mut Vec<NavLink>,
    href: &str,
    title: String,
    depth: usize,
    base_url: &Url,
    seen: &mut HashSet<String>,
) -> bool {
    if let Some(url) = normalize(href, base_url) {
        if !seen.contains(&url) && !should_skip(&url) {
            seen.insert(url.clone());
            out.push(NavLink::page(url, title, depth));
            return true;
        }
    }
    false
}

/// Recursively walks a nested `ol`/`ul` navigation list
///
/// For each direct `li`: the first anchor becomes a page link at the current
/// depth, and any directly nested list is walked one level deeper.
pub(crate) fn process_nav_list(
    list: ElementRef,
    base_url: &Url,
    seen: &mut HashSet<String>,
    depth: usize,
    out: &mut Vec<NavLink>,
) {
    for li in child_elements(list).filter(|el| el.value().name() == "li") {
        if let Some(link) = li.select(&ANCHOR).next() {
            if let Some(href) = link.value().attr("href") {
                push_page_link(out, href, element_text(link), depth, base_url, seen);
            }
        }

        for nested in
            child_elements(li).filter(|el| matches!(el.value().name(), "ol" | "ul"))
        {
            process_nav_list(nested, base_url, seen, depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn base() -> Url {
        Url::parse("https://docs.example.com/").unwrap()
    }

    #[test]
    fn test_flat_list() {
        let html = Html::parse_fragment(
            r#"<ul><li><a href="/a">A</a></li><li><a href="/b">B</a></li></ul>"#,
        );
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let root = child_elements(html.root_element()).next().unwrap();
        process_nav_list(root, &base(), &mut seen, 0, &mut out);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].title, "A");
        assert_eq!(out[0].depth, 0);
    }

    #[test]
    fn test_nested_list_increments_depth() {
        let html = Html::parse_fragment(
            r#"<ul><li><a href="/a">A</a><ul><li><a href="/a/b">B</a></li></ul></li></ul>"#,
        );
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let root = child_elements(html.root_element()).next().unwrap();
        process_nav_list(root, &base(), &mut seen, 0, &mut out);

        assert_eq!(out.len(), 2);
        assert_eq!(out[1].title, "B");
        assert_eq!(out[1].depth, 1);
    }

    #[test]
    fn test_seen_urls_suppressed() {
        let html = Html::parse_fragment(
            r#"<ul><li><a href="/a">A</a></li><li><a href="/a">A again</a></li></ul>"#,
        );
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let root = child_elements(html.root_element()).next().unwrap();
        process_nav_list(root, &base(), &mut seen, 0, &mut out);

        assert_eq!(out.len(), 1);
    }
}
