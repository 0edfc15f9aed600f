//! Mintlify-style navigation extraction
//!
//! Mintlify renders the full site navigation into a `#navigation-items`
//! container on every page (global navigation), grouping pages under
//! `sidebar-group-header` section titles.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

use crate::nav::walk::{child_elements, element_text, process_nav_list};
use crate::nav::NavLink;

static NAVIGATION_ITEMS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#navigation-items").expect("valid selector"));
static GROUP_HEADER: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".sidebar-group-header").expect("valid selector"));
static GROUP_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h5, h4, h3, span").expect("valid selector"));
static SIDEBAR_GROUP: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".sidebar-group").expect("valid selector"));
static ANY_LIST: Lazy<Selector> = Lazy::new(|| Selector::parse("ul").expect("valid selector"));

pub(crate) fn can_handle(doc: &Html) -> bool {
    doc.select(&NAVIGATION_ITEMS).next().is_some()
}

pub(crate) fn extract(doc: &Html, base_url: &Url, seen: &mut HashSet<String>) -> Vec<NavLink> {
    let mut links = Vec::new();

    let Some(container) = doc.select(&NAVIGATION_ITEMS).next() else {
        return links;
    };

    for child in child_elements(container) {
        if let Some(header) = child.select(&GROUP_HEADER).next() {
            if let Some(title_el) = header.select(&GROUP_TITLE).next() {
                let section_title = element_text(title_el);
                if !section_title.is_empty() {
                    links.push(NavLink::header(section_title, 0));
                }
            }

            let group = child
                .select(&SIDEBAR_GROUP)
                .next()
                .or_else(|| child.select(&ANY_LIST).next());
            if let Some(group) = group {
                for list in child_elements(group).filter(|el| matches!(el.value().name(), "ol" | "ul"))
                {
                    process_nav_list(list, base_url, seen, 1, &mut links);
                }
                if group.value().name() == "ul" {
                    process_nav_list(group, base_url, seen, 1, &mut links);
                }
            }
        } else if child.value().name() == "ul" {
            process_nav_list(child, base_url, seen, 0, &mut links);
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <html><body>
        <div id="navigation-items">
          <div>
            <div class="sidebar-group-header"><h5>Getting Started</h5></div>
            <ul class="sidebar-group">
              <li><a href="/quickstart">Quickstart</a></li>
              <li><a href="/installation">Installation</a></li>
            </ul>
          </div>
          <ul>
            <li><a href="/changelog">Changelog</a></li>
          </ul>
        </div>
        </body></html>
    "#;

    fn base() -> Url {
        Url::parse("https://docs.example.com/").unwrap()
    }

    #[test]
    fn test_can_handle() {
        assert!(can_handle(&Html::parse_document(SAMPLE)));
        assert!(!can_handle(&Html::parse_document("<html><body></body></html>")));
    }

    #[test]
    fn test_extracts_section_header_and_links() {
        let doc = Html::parse_document(SAMPLE);
        let mut seen = HashSet::new();
        let links = extract(&doc, &base(), &mut seen);

        assert_eq!(links[0], NavLink::header("Getting Started".to_string(), 0));
        assert_eq!(
            links[1],
            NavLink::page("https://docs.example.com/quickstart".to_string(), "Quickstart".to_string(), 1)
        );
        assert_eq!(links[3].depth, 0);
        assert_eq!(links[3].title, "Changelog");
    }
}
