//! Vocs-style navigation extraction
//!
//! Vocs sidebars are built from nested `section.vocs_Sidebar_section`
//! elements. A section header may be a plain title div, a non-linked item
//! div, or an anchor that is both a page and a section head; children are
//! indented one level under whichever header form is present.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::nav::walk::{child_elements, element_text, has_class, push_page_link};
use crate::nav::NavLink;

static SIDEBAR_NAV: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".vocs_Sidebar_navigation").expect("valid selector"));
static SECTION_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.vocs_Sidebar_sectionTitle").expect("valid selector"));
static ITEM_DIV: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.vocs_Sidebar_item").expect("valid selector"));
static ITEM_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.vocs_Sidebar_item[href]").expect("valid selector"));
static ANY_ANCHOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a").expect("valid selector"));

pub(crate) fn can_handle(doc: &Html) -> bool {
    doc.select(&SIDEBAR_NAV).next().is_some()
}

pub(crate) fn extract(doc: &Html, base_url: &Url, seen: &mut HashSet<String>) -> Vec<NavLink> {
    let mut links = Vec::new();

    let Some(nav) = doc.select(&SIDEBAR_NAV).next() else {
        return links;
    };

    for child in child_elements(nav) {
        if is_section(child) {
            process_section(child, base_url, seen, 0, &mut links);
        } else if child.value().name() == "div" && has_class(child, "vocs_Sidebar_group") {
            for section in child_elements(child).filter(|el| is_section(*el)) {
                process_section(section, base_url, seen, 0, &mut links);
            }
        }
    }

    links
}

fn is_section(el: ElementRef) -> bool {
    el.value().name() == "section" && has_class(el, "vocs_Sidebar_section")
}

fn process_section(
    section: ElementRef,
    base_url: &Url,
    seen: &mut HashSet<String>,
    depth: usize,
    out: &mut Vec<NavLink>,
) {
    let mut has_header = false;

    let header = child_elements(section)
        .find(|el| el.value().name() == "div" && has_class(*el, "vocs_Sidebar_sectionHeader"));

    if let Some(header) = header {
        // Plain title header like "Getting Started"
        if let Some(title_el) = header.select(&SECTION_TITLE).next() {
            let title = element_text(title_el);
            if !title.is_empty() {
                out.push(NavLink::header(title, depth));
                has_header = true;
            }
        }

        // Non-linked item div acting as a header
        if !has_header {
            if let Some(item) = header.select(&ITEM_DIV).next() {
                if item.select(&ANY_ANCHOR).next().is_none() {
                    let title = element_text(item);
                    if !title.is_empty() {
                        out.push(NavLink::header(title, depth));
                        has_header = true;
                    }
                }
            }
        }

        // A header anchor is both a page and a section head
        if let Some(link) = header.select(&ITEM_LINK).next() {
            if let Some(href) = link.value().attr("href") {
                if push_page_link(out, href, element_text(link), depth, base_url, seen) {
                    has_header = true;
                }
            }
        }
    }

    let child_depth = if has_header { depth + 1 } else { depth };

    let items = child_elements(section)
        .find(|el| el.value().name() == "div" && has_class(*el, "vocs_Sidebar_items"));

    if let Some(items) = items {
        for link in child_elements(items)
            .filter(|el| el.value().name() == "a" && has_class(*el, "vocs_Sidebar_item"))
        {
            if let Some(href) = link.value().attr("href") {
                push_page_link(out, href, element_text(link), child_depth, base_url, seen);
            }
        }
    }

    for nested in child_elements(section).filter(|el| is_section(*el)) {
        process_section(nested, base_url, seen, child_depth, out);
    }

    if let Some(items) = items {
        for nested in child_elements(items).filter(|el| is_section(*el)) {
            process_section(nested, base_url, seen, child_depth, out);
        }
    }
}
