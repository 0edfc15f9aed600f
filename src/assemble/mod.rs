//! Markdown assembly
//!
//! Turns the crawl's page table into one ordered Markdown document: a table
//! of contents followed by every page's content under a top-level heading.
//!
//! # Ordering
//!
//! When navigation extraction was order-preserving (or the site has global
//! navigation), discovery order is authoritative. Otherwise pages are sorted
//! structurally by URL path: root first, top-level pages alphabetically,
//! then multi-segment pages grouped by their first path segment. Section
//! headers are slotted in front of the page group their title names.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::content::flatten_headings;
use crate::crawler::Page;
use crate::nav::NavFlags;

static H2_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^## (.+)$").expect("valid regex"));
static HEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)*)[.\s]").expect("valid regex"));

/// Lowercase, hyphenated, anchor-safe rendering of a title
///
/// Used identically for table-of-contents anchors and body headings so the
/// links resolve.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true;
    for c in title.chars() {
        if c.is_alphanumeric() {
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Assembles the final Markdown document from the crawl's page table
///
/// Returns an empty string when no page carries content; the caller treats
/// that as a failed crawl.
pub fn generate_markdown(pages: &[Page], flags: NavFlags) -> String {
    if !pages.iter().any(|p| has_content(p)) {
        return String::new();
    }

    let mut sorted: Vec<&Page> = pages.iter().collect();
    if flags.global_nav || flags.preserves_order {
        sorted.sort_by_key(|p| p.index);
    } else {
        let groups = multi_segment_groups(pages);
        sorted.sort_by(|a, b| sort_key(a, &groups).cmp(&sort_key(b, &groups)));
    }

    let surviving = suppress_empty_headers(&sorted);

    let mut parts: Vec<String> = Vec::new();
    parts.push("# Table of Contents\n".to_string());

    let single_page = pages.iter().filter(|p| has_content(p)).count() == 1;
    let mut seen_urls = HashSet::new();
    let mut seen_headers = HashSet::new();

    for page in &surviving {
        let title = page.title.trim();
        if title.is_empty() {
            continue;
        }
        // Headers deduplicate by title, pages by URL; a page may share its
        // title with a header
        match &page.url {
            None => {
                if !seen_headers.insert(title.to_string()) {
                    continue;
                }
            }
            Some(url) => {
                if !seen_urls.insert(url.clone()) {
                    continue;
                }
            }
        }

        let indent = "  ".repeat(page.depth);
        match &page.url {
            None => parts.push(format!("{}**{}**", indent, title)),
            Some(_) => {
                parts.push(format!("{}- [{}](#{})", indent, title, slugify(title)));
                if single_page {
                    if let Some(content) = &page.content {
                        push_heading_subentries(&mut parts, &flatten_headings(content));
                    }
                }
            }
        }
    }

    parts.push("\n---\n".to_string());

    let mut seen_titles = HashSet::new();
    for page in &sorted {
        let title = page.title.trim();
        let Some(content) = page.content.as_deref().map(str::trim) else {
            continue;
        };
        if title.is_empty() || content.is_empty() {
            continue;
        }
        if !seen_titles.insert(title.to_string()) {
            continue;
        }

        parts.push(format!("\n# {}", title));
        if let Some(url) = &page.url {
            parts.push(format!("\nSource: {}\n", url));
        }
        // A lone page's own heading structure becomes the document outline,
        // so its deep headings collapse to the outline level
        if single_page {
            parts.push(flatten_headings(content));
        } else {
            parts.push(content.to_string());
        }
        parts.push("\n---\n".to_string());
    }

    parts.join("\n")
}

fn has_content(page: &Page) -> bool {
    page.content
        .as_deref()
        .is_some_and(|c| !c.trim().is_empty())
}

/// Nested TOC entries for a single-page document, derived from its `##`
/// headings; numbered headings ("1.2 Topic") set the nesting level and
/// unnumbered ones hang one level below the last numbered heading
fn push_heading_subentries(parts: &mut Vec<String>, content: &str) {
    let mut last_numbered_level = 0usize;
    for caps in H2_HEADING.captures_iter(content) {
        let heading = caps[1].trim();
        if heading.is_empty() {
            continue;
        }
        let level = match HEADING_NUMBER.captures(heading) {
            Some(number) => {
                let depth = number[1].matches('.').count() + 1;
                last_numbered_level = depth;
                depth
            }
            None => last_numbered_level + 1,
        };
        let indent = "  ".repeat(level);
        parts.push(format!("{}- [{}](#{})", indent, heading, slugify(heading)));
    }
}

/// Drops section headers with no deeper page before the next sibling-or-
/// shallower header
fn suppress_empty_headers<'a>(sorted: &[&'a Page]) -> Vec<&'a Page> {
    let mut kept = Vec::with_capacity(sorted.len());
    for (i, page) in sorted.iter().enumerate() {
        if page.url.is_some() {
            kept.push(*page);
            continue;
        }

        let mut introduces_pages = false;
        for following in &sorted[i + 1..] {
            if following.url.is_none() && following.depth <= page.depth {
                break;
            }
            if following.url.is_some() && following.depth > page.depth {
                introduces_pages = true;
                break;
            }
        }
        if introduces_pages {
            kept.push(*page);
        }
    }
    kept
}

fn path_segments(url: &str) -> Vec<String> {
    match Url::parse(url) {
        Ok(parsed) => parsed
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// First path segments that own more than one level of pages; used to slot
/// section entry pages and headers in front of their group
fn multi_segment_groups(pages: &[Page]) -> HashSet<String> {
    pages
        .iter()
        .filter_map(|p| p.url.as_deref())
        .map(path_segments)
        .filter(|segments| segments.len() > 1)
        .map(|segments| segments[0].clone())
        .collect()
}

/// Structural sort key: (band, group, path-within-group)
///
/// Band 0 is the root page, band 1 top-level pages and unmatched headers,
/// band 2 grouped multi-segment pages with their headers slotted first.
fn sort_key(page: &Page, groups: &HashSet<String>) -> (u8, String, String) {
    match page.url.as_deref() {
        Some(url) => {
            let segments = path_segments(url);
            if segments.is_empty() {
                return (0, String::new(), String::new());
            }
            let prefix = &segments[0];
            if groups.contains(prefix) {
                // A single-segment entry page sorts right behind its header
                let sort_path = if segments.len() > 1 {
                    segments.join("/")
                } else {
                    format!("{}/!", prefix)
                };
                (2, prefix.clone(), sort_path)
            } else {
                (1, String::new(), segments.join("/"))
            }
        }
        None => {
            let slug = slugify(&page.title);
            let group = groups
                .iter()
                .find(|g| {
                    slug == **g
                        || slug.starts_with(&format!("{}-", g))
                        || slug.split('-').any(|word| word == g.as_str())
                })
                .cloned();
            match group {
                Some(group) if page.depth == 0 => (2, group, String::new()),
                // Subsection headers land after their group's pages
                Some(group) => (2, group, format!("zzz-{}", slug)),
                None => (1, String::new(), format!("!header-{:04}", page.index)),
            }
        }
    }
}
