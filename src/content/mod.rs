//! Content extraction
//!
//! Locates the main content region of a fetched page, strips chrome and
//! boilerplate from it, resolves a page title through a prioritized fallback
//! chain and hands the cleaned HTML to the Markdown conversion boundary.

mod convert;

pub use convert::{flatten_headings, to_markdown};

use ego_tree::NodeId;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

static ARTICLE: Lazy<Selector> = Lazy::new(|| Selector::parse("article").expect("valid selector"));
static CONTENT_AREA: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div#content-area").expect("valid selector"));
static MAIN: Lazy<Selector> = Lazy::new(|| Selector::parse("main").expect("valid selector"));
static CONTENT_DIV: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.markdown, div.content, div.article, div.documentation")
        .expect("valid selector")
});
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").expect("valid selector"));
static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("valid selector"));
static TITLE_TAG: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("valid selector"));

/// Elements removed wholesale from the main content region
const CHROME_TAGS: &[&str] = &[
    "nav", "aside", "header", "footer", "script", "style", "iframe", "noscript",
];

static SIDEBAR_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)sidebar|nav|menu").expect("valid regex"));
static WIDGET_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)edit-?this-?page|feedback|copy-?button").expect("valid regex")
});
static TITLE_DELIMITER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*[|\-\u{2013}\u{2014}]\s*").expect("valid regex"));

/// The outcome of extracting one fetched page
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    pub title: String,
    pub markdown: String,
}

/// Extracts the title and Markdown content of one fetched page
///
/// Never fails outright: a page whose main region cannot be located (or
/// whose region converts to nothing) comes back with empty `markdown`, which
/// the caller counts as a failed page without aborting the crawl.
pub fn extract_page(html: &str, url: &str) -> ExtractedPage {
    let mut doc = Html::parse_document(html);

    let title = resolve_title(&doc, url);

    let Some(region) = main_content_node(&doc) else {
        return ExtractedPage {
            title,
            markdown: String::new(),
        };
    };

    strip_chrome(&mut doc, region);

    let fragment = doc
        .tree
        .get(region)
        .and_then(ElementRef::wrap)
        .map(|el| el.html())
        .unwrap_or_default();

    ExtractedPage {
        title,
        markdown: to_markdown(&fragment),
    }
}

/// Picks the main content region, most specific container first
fn main_content_node(doc: &Html) -> Option<NodeId> {
    for selector in [&*ARTICLE, &*CONTENT_AREA, &*MAIN, &*CONTENT_DIV, &*BODY] {
        if let Some(el) = doc.select(selector).next() {
            return Some(el.id());
        }
    }
    None
}

/// Title fallback chain: content h1, document title, humanized URL segment
fn resolve_title(doc: &Html, url: &str) -> String {
    if let Some(h1) = doc.select(&H1).next() {
        let text = collapse_text(h1);
        if !text.is_empty() {
            return text;
        }
    }

    if let Some(title_tag) = doc.select(&TITLE_TAG).next() {
        let raw = collapse_text(title_tag);
        // Drop the site-name suffix ("Page | Site", "Page - Site")
        let cleaned = TITLE_DELIMITER
            .split(&raw)
            .next()
            .unwrap_or("")
            .trim()
            .to_string();
        if !cleaned.is_empty() {
            return cleaned;
        }
    }

    if let Ok(parsed) = Url::parse(url) {
        if let Some(segment) = parsed
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .next_back()
        {
            let humanized = humanize_segment(segment);
            if !humanized.is_empty() {
                return humanized;
            }
        }
    }

    "Untitled Page".to_string()
}

fn collapse_text(el: ElementRef) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Turns `getting-started` into `Getting Started`
fn humanize_segment(segment: &str) -> String {
    segment
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Removes navigation, scripts, sidebars and widget controls from a region
///
/// Mutates the parsed tree in place by detaching the offending nodes; the
/// region node itself is never removed.
fn strip_chrome(doc: &mut Html, region: NodeId) {
    let mut doomed: Vec<NodeId> = Vec::new();

    {
        let Some(root) = doc.tree.get(region).and_then(ElementRef::wrap) else {
            return;
        };

        for el in root.descendants().filter_map(ElementRef::wrap) {
            if el.id() == region {
                continue;
            }
            let value = el.value();

            if CHROME_TAGS.contains(&value.name()) {
                doomed.push(el.id());
                continue;
            }

            if value.id().is_some_and(|id| SIDEBAR_ID.is_match(id)) {
                doomed.push(el.id());
                continue;
            }

            if value
                .attr("class")
                .is_some_and(|classes| WIDGET_CLASS.is_match(classes))
            {
                doomed.push(el.id());
                continue;
            }

            if value.name() == "a" {
                // Whole-label match only: "Next.js guide" is content
                let text = collapse_text(el);
                if text == "Previous" || text == "Next" {
                    doomed.push(el.id());
                }
            }
        }
    }

    for id in doomed {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_preferred_over_main() {
        let html = "<main><p>outer</p><article><p>inner</p></article></main>";
        let page = extract_page(html, "https://x/p");
        assert!(page.markdown.contains("inner"));
        assert!(!page.markdown.contains("outer"));
    }

    #[test]
    fn test_body_fallback_when_no_containers() {
        let html = "<html><body><p>just text</p></body></html>";
        let page = extract_page(html, "https://x/p");
        assert!(page.markdown.contains("just text"));
    }

    #[test]
    fn test_title_from_h1() {
        let html = "<h1>Real Title</h1><title>Other | Site</title>";
        let page = extract_page(html, "https://x/p");
        assert_eq!(page.title, "Real Title");
    }

    #[test]
    fn test_title_from_title_tag_strips_site_name() {
        let html = "<html><head><title>Quickstart | Example Docs</title></head><body></body></html>";
        let page = extract_page(html, "https://x/p");
        assert_eq!(page.title, "Quickstart");
    }

    #[test]
    fn test_title_humanized_from_path() {
        let html = "<html><body></body></html>";
        let page = extract_page(html, "https://x/docs/getting-started");
        assert_eq!(page.title, "Getting Started");
    }

    #[test]
    fn test_title_last_resort() {
        let html = "<html><body></body></html>";
        let page = extract_page(html, "https://x/");
        assert_eq!(page.title, "Untitled Page");
    }

    #[test]
    fn test_chrome_stripped() {
        let html = r#"<article>
            <nav><a href="/x">Nav link</a></nav>
            <div id="sidebar-left"><p>sidebar junk</p></div>
            <p>kept paragraph</p>
            <footer>footer junk</footer>
        </article>"#;
        let page = extract_page(html, "https://x/p");
        assert!(page.markdown.contains("kept paragraph"));
        assert!(!page.markdown.contains("Nav link"));
        assert!(!page.markdown.contains("sidebar junk"));
        assert!(!page.markdown.contains("footer junk"));
    }

    #[test]
    fn test_pagination_anchors_stripped() {
        let html = r#"<article>
            <p>body</p>
            <a href="/a">Previous</a><a href="/b">Next</a>
        </article>"#;
        let page = extract_page(html, "https://x/p");
        assert!(!page.markdown.contains("Previous"));
        assert!(!page.markdown.contains("Next"));
    }

    #[test]
    fn test_links_merely_mentioning_next_kept() {
        let html = r#"<article>
            <p>body</p>
            <a href="/nextjs">Next.js guide</a>
            <a href="/b">Next</a>
        </article>"#;
        let page = extract_page(html, "https://x/p");
        assert!(page.markdown.contains("Next.js guide"));
        assert!(!page.markdown.contains("[Next]("));
    }

    #[test]
    fn test_widget_controls_stripped() {
        let html = r#"<article>
            <p>body</p>
            <div class="EditThisPageButton_container">Edit this page</div>
            <span class="copy-button">Copy</span>
        </article>"#;
        let page = extract_page(html, "https://x/p");
        assert!(!page.markdown.contains("Edit this page"));
        assert!(!page.markdown.contains("Copy"));
    }
}
