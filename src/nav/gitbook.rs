//! Classic GitBook navigation extraction
//!
//! Traditional GitBook themes render the sidebar as nested lists inside a
//! `nav` or `aside` element. Pagination links labelled via `aria-label` are
//! harvested too, since some themes expose otherwise-unreachable pages only
//! through them.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

use crate::nav::walk::{child_elements, element_text, process_nav_list, push_page_link};
use crate::nav::NavLink;

static NAV_OR_ASIDE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("nav, aside").expect("valid selector"));
static ANY_LIST: Lazy<Selector> =
    Lazy::new(|| Selector::parse("ol, ul").expect("valid selector"));
static LABELLED_ANCHOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[aria-label][href]").expect("valid selector"));

pub(crate) fn can_handle(doc: &Html) -> bool {
    doc.select(&NAV_OR_ASIDE)
        .any(|nav| nav.select(&ANY_LIST).next().is_some())
}

pub(crate) fn extract(doc: &Html, base_url: &Url, seen: &mut HashSet<String>) -> Vec<NavLink> {
    let mut links = Vec::new();

    for nav in doc.select(&NAV_OR_ASIDE) {
        let direct: Vec<_> = child_elements(nav)
            .filter(|el| matches!(el.value().name(), "ol" | "ul"))
            .collect();
        if direct.is_empty() {
            for list in nav.select(&ANY_LIST) {
                process_nav_list(list, base_url, seen, 0, &mut links);
            }
        } else {
            for list in direct {
                process_nav_list(list, base_url, seen, 0, &mut links);
            }
        }
    }

    // Next/Previous pagination links sometimes reach pages the sidebar omits
    for anchor in doc.select(&LABELLED_ANCHOR) {
        let label = anchor.value().attr("aria-label").unwrap_or("");
        if !label.eq_ignore_ascii_case("next") && !label.eq_ignore_ascii_case("previous") {
            continue;
        }
        if let Some(href) = anchor.value().attr("href") {
            push_page_link(&mut links, href, element_text(anchor), 0, base_url, seen);
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://docs.example.com/").unwrap()
    }

    #[test]
    fn test_can_handle_requires_list_inside_nav() {
        let with_list = Html::parse_document("<nav><ul><li>x</li></ul></nav>");
        let without = Html::parse_document("<nav><p>no lists</p></nav>");
        assert!(can_handle(&with_list));
        assert!(!can_handle(&without));
    }

    #[test]
    fn test_nested_sidebar_depths() {
        let doc = Html::parse_document(
            r#"<aside>
                <ul>
                  <li><a href="/intro">Intro</a>
                    <ul><li><a href="/intro/setup">Setup</a></li></ul>
                  </li>
                </ul>
            </aside>"#,
        );
        let mut seen = HashSet::new();
        let links = extract(&doc, &base(), &mut seen);

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].depth, 0);
        assert_eq!(links[1].depth, 1);
        assert_eq!(
            links[1].url.as_deref(),
            Some("https://docs.example.com/intro/setup")
        );
    }

    #[test]
    fn test_pagination_links_harvested() {
        let doc = Html::parse_document(
            r#"<nav><ul><li><a href="/a">A</a></li></ul></nav>
               <a aria-label="Next" href="/b">B page</a>"#,
        );
        let mut seen = HashSet::new();
        let links = extract(&doc, &base(), &mut seen);

        assert_eq!(links.len(), 2);
        assert_eq!(links[1].title, "B page");
    }
}
