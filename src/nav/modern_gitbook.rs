//! Modern GitBook navigation extraction
//!
//! Next.js-era GitBook renders its sidebar as a `#table-of-contents`
//! container styled with Tailwind utility classes. Section headers carry no
//! semantic markup at all, only a styling fingerprint (uppercase,
//! tracking-wide, font-semibold, often sticky), so header detection scores
//! class tokens instead of looking for heading tags.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::nav::walk::{child_elements, class_string, element_text, push_page_link};
use crate::nav::NavLink;

static TOC_ID: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#table-of-contents").expect("valid selector"));
static TOC_TESTID: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"[data-testid="table-of-contents"]"#).expect("valid selector")
});
static TOCLINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".toclink").expect("valid selector"));
static ASIDE: Lazy<Selector> = Lazy::new(|| Selector::parse("aside").expect("valid selector"));
static CLASSED: Lazy<Selector> = Lazy::new(|| Selector::parse("[class]").expect("valid selector"));
static ANCHOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid selector"));

pub(crate) fn can_handle(doc: &Html) -> bool {
    if doc.select(&TOC_ID).next().is_some() || doc.select(&TOC_TESTID).next().is_some() {
        return true;
    }
    if doc.select(&TOCLINK).next().is_some() {
        return true;
    }
    // Tailwind group variant classes ("group/toclink") cannot appear in a
    // selector, so scan class attributes directly
    doc.select(&CLASSED)
        .any(|el| el.value().classes().any(|c| c.contains("group/toclink")))
}

pub(crate) fn extract(doc: &Html, base_url: &Url, seen: &mut HashSet<String>) -> Vec<NavLink> {
    let mut links = Vec::new();

    let toc = doc
        .select(&TOC_ID)
        .next()
        .or_else(|| doc.select(&TOC_TESTID).next())
        .or_else(|| {
            doc.select(&ASIDE)
                .find(|aside| aside.select(&TOCLINK).next().is_some())
        });

    let Some(toc) = toc else {
        return links;
    };

    process_toc(toc, base_url, seen, 0, &mut links);
    links
}

/// Scores styling classes to decide whether an element is a section header
fn is_section_header(el: ElementRef) -> bool {
    let classes = class_string(el);
    let indicators = ["uppercase", "tracking-wide", "font-semibold"];
    let matches = indicators.iter().filter(|i| classes.contains(*i)).count();

    if classes.contains("sticky") && matches >= 1 {
        return true;
    }
    matches >= 2
}

fn is_toclink(el: ElementRef) -> bool {
    el.value()
        .classes()
        .any(|c| c == "toclink" || c.contains("group/toclink"))
}

fn in_toc_container(el: ElementRef) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| a.value().id() == Some("table-of-contents"))
}

fn process_toc(
    container: ElementRef,
    base_url: &Url,
    seen: &mut HashSet<String>,
    depth: usize,
    out: &mut Vec<NavLink>,
) {
    for child in child_elements(container) {
        match child.value().name() {
            "div" | "span" if is_section_header(child) => {
                let title = element_text(child);
                if title.chars().count() > 1 {
                    out.push(NavLink::header(title, depth));
                }
            }
            "li" => {
                let header = child
                    .select(&CLASSED)
                    .find(|el| {
                        matches!(el.value().name(), "div" | "span") && is_section_header(*el)
                    });

                if let Some(header) = header {
                    let title = element_text(header);
                    if title.chars().count() > 1 {
                        out.push(NavLink::header(title, depth));
                    }
                    for nested in child_elements(child)
                        .filter(|el| matches!(el.value().name(), "ul" | "div"))
                    {
                        if nested.id() != header.id() {
                            process_toc(nested, base_url, seen, depth + 1, out);
                        }
                    }
                    continue;
                }

                let link = child_elements(child)
                    .find(|el| el.value().name() == "a" && el.value().attr("href").is_some())
                    .or_else(|| child.select(&ANCHOR).next());

                if let Some(link) = link {
                    if is_toclink(link) || in_toc_container(link) {
                        if let Some(href) = link.value().attr("href") {
                            push_page_link(out, href, element_text(link), depth, base_url, seen);
                        }
                    }
                }
            }
            "ul" => process_toc(child, base_url, seen, depth, out),
            "div" if child.select(&TOCLINK).next().is_some() => {
                process_toc(child, base_url, seen, depth, out)
            }
            _ => {}
        }
    }
}
