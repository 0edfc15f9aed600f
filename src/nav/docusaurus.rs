//! Docusaurus navigation extraction
//!
//! Docusaurus v2/v3 sidebars use Infima's `menu__list`/`menu__link` class
//! convention. Collapsible categories carry `menu__link--sublist` or the
//! `theme-doc-sidebar-item-category` class; some custom themes add
//! non-linked `sidebar-title` section headers between top-level items.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::nav::walk::{
    child_elements, class_string, element_text, has_class, has_class_containing, push_page_link,
};
use crate::nav::NavLink;

static MENU_LIST: Lazy<Selector> =
    Lazy::new(|| Selector::parse("ul.menu__list").expect("valid selector"));
static MENU_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.menu__link").expect("valid selector"));
static NAV_MENU: Lazy<Selector> =
    Lazy::new(|| Selector::parse("nav.menu").expect("valid selector"));
static ASIDE: Lazy<Selector> = Lazy::new(|| Selector::parse("aside").expect("valid selector"));
static SUBLIST_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".menu__link--sublist").expect("valid selector"));
static SIDEBAR_TITLE_SPAN: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.sidebar-title").expect("valid selector"));

pub(crate) fn can_handle(doc: &Html) -> bool {
    doc.select(&MENU_LIST).next().is_some() && doc.select(&MENU_LINK).next().is_some()
}

pub(crate) fn extract(doc: &Html, base_url: &Url, seen: &mut HashSet<String>) -> Vec<NavLink> {
    let mut links = Vec::new();

    let Some(sidebar) = find_sidebar(doc) else {
        return links;
    };

    let direct: Vec<_> = child_elements(sidebar)
        .filter(|el| el.value().name() == "ul" && has_class(*el, "menu__list"))
        .collect();

    if direct.is_empty() {
        for list in sidebar.select(&MENU_LIST) {
            process_menu_list(list, base_url, seen, 0, &mut links);
        }
    } else {
        for list in direct {
            process_menu_list(list, base_url, seen, 0, &mut links);
        }
    }

    links
}

fn find_sidebar(doc: &Html) -> Option<ElementRef<'_>> {
    if let Some(nav) = doc.select(&NAV_MENU).next() {
        return Some(nav);
    }
    if let Some(aside) = doc.select(&ASIDE).find(|el| {
        has_class_containing(*el, "docSidebar") || has_class_containing(*el, "theme-doc-sidebar")
    }) {
        return Some(aside);
    }
    // Any menu list at all: walk up to its parent container
    doc.select(&MENU_LIST)
        .next()
        .and_then(|list| list.parent().and_then(ElementRef::wrap))
}

fn process_menu_list(
    list: ElementRef,
    base_url: &Url,
    seen: &mut HashSet<String>,
    depth: usize,
    out: &mut Vec<NavLink>,
) {
    // Non-linked section headers indent everything that follows them
    let mut in_section = false;

    for li in child_elements(list).filter(|el| el.value().name() == "li") {
        let classes = class_string(li);

        if classes.contains("sidebar-title") {
            if let Some(span) = li.select(&SIDEBAR_TITLE_SPAN).next() {
                let title = element_text(span);
                if !title.is_empty() {
                    out.push(NavLink::header(title, depth));
                    in_section = true;
                }
            }
            continue;
        }

        if !classes.contains("menu__list-item") {
            continue;
        }

        let current_depth = if in_section { depth + 1 } else { depth };

        let is_category = classes.contains("theme-doc-sidebar-item-category")
            || li.select(&SUBLIST_LINK).next().is_some();

        if is_category {
            let category_link = li
                .select(&SUBLIST_LINK)
                .next()
                .filter(|el| el.value().name() == "a")
                .or_else(|| li.select(&MENU_LINK).next());
            let nested = li.select(&MENU_LIST).next();

            if let Some(link) = category_link {
                let title = element_text(link);
                let href = link.value().attr("href").unwrap_or("");

                if !href.is_empty() && href != "#" && !href.starts_with('#') {
                    let pushed =
                        push_page_link(out, href, title.clone(), current_depth, base_url, seen);
                    // Already-seen category pages still head their subtree in
                    // the table of contents
                    if !pushed && !title.is_empty() && nested.is_some() {
                        out.push(NavLink::header(title, current_depth));
                    }
                } else if !title.is_empty() {
                    out.push(NavLink::header(title, current_depth));
                }
            }

            if let Some(nested) = nested {
                process_menu_list(nested, base_url, seen, current_depth + 1, out);
            }
        } else if let Some(link) = li.select(&MENU_LINK).next() {
            if let Some(href) = link.value().attr("href") {
                push_page_link(out, href, element_text(link), current_depth, base_url, seen);
            }
        }
    }
}
