//! Navigation discovery
//!
//! Documentation sites render their sidebar with wildly different DOM shapes.
//! Each recognized template family gets one extraction strategy; strategies
//! are tried in a fixed priority order and the first one that both claims the
//! page and yields links wins. The generic link-harvesting [`Strategy::Fallback`]
//! always claims the page, so extraction never dead-ends.
//!
//! Two template families need supplemental passes when their static markup is
//! incomplete: Vocs-style sidebars collapse sections behind client-side
//! toggles, and modern GitBook hydrates most of its table of contents on the
//! client. In both cases the fallback harvester runs over the same page and
//! its results are merged in, and [`NavFlags`] tells the crawl orchestrator
//! how much to trust the extraction order.

mod docusaurus;
mod fallback;
mod gitbook;
mod mintlify;
mod modern_gitbook;
mod vocs;
pub(crate) mod walk;

use std::collections::HashSet;

use scraper::Html;
use tracing::debug;
use url::Url;

/// One discovered navigation entry
///
/// `url = None` marks a bare section header: no fetchable content, used only
/// for grouping in the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub url: Option<String>,
    pub title: String,
    pub depth: usize,
}

impl NavLink {
    pub fn page(url: String, title: String, depth: usize) -> Self {
        NavLink {
            url: Some(url),
            title,
            depth,
        }
    }

    pub fn header(title: String, depth: usize) -> Self {
        NavLink {
            url: None,
            title,
            depth,
        }
    }

    pub fn is_header(&self) -> bool {
        self.url.is_none()
    }
}

/// How much the orchestrator may trust the extracted navigation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavFlags {
    /// The sidebar is identical on every page, so the root extraction covers
    /// the whole site and per-page re-extraction is unnecessary.
    pub global_nav: bool,
    /// Extraction order is reliable enough to drive the final document sort.
    pub preserves_order: bool,
    /// The static sidebar was collapsed or incomplete and fallback harvesting
    /// was merged in. Bare headers found in sub-page navigation must be
    /// dropped because they describe local context, not site structure.
    pub sparse_nav: bool,
}

/// The outcome of running navigation extraction over one page
#[derive(Debug, Clone)]
pub struct NavExtraction {
    pub links: Vec<NavLink>,
    pub flags: NavFlags,
    pub strategy: Strategy,
}

/// The closed set of recognized sidebar template families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Mintlify,
    Vocs,
    Docusaurus,
    ModernGitBook,
    GitBook,
    Fallback,
}

/// Most template-specific first; `Fallback` always matches
const PRIORITY: [Strategy; 6] = [
    Strategy::Mintlify,
    Strategy::Vocs,
    Strategy::Docusaurus,
    Strategy::ModernGitBook,
    Strategy::GitBook,
    Strategy::Fallback,
];

impl Strategy {
    pub fn can_handle(self, doc: &Html) -> bool {
        match self {
            Strategy::Mintlify => mintlify::can_handle(doc),
            Strategy::Vocs => vocs::can_handle(doc),
            Strategy::Docusaurus => docusaurus::can_handle(doc),
            Strategy::ModernGitBook => modern_gitbook::can_handle(doc),
            Strategy::GitBook => gitbook::can_handle(doc),
            Strategy::Fallback => true,
        }
    }

    pub fn extract(
        self,
        doc: &Html,
        base_url: &Url,
        seen: &mut HashSet<String>,
    ) -> Vec<NavLink> {
        match self {
            Strategy::Mintlify => mintlify::extract(doc, base_url, seen),
            Strategy::Vocs => vocs::extract(doc, base_url, seen),
            Strategy::Docusaurus => docusaurus::extract(doc, base_url, seen),
            Strategy::ModernGitBook => modern_gitbook::extract(doc, base_url, seen),
            Strategy::GitBook => gitbook::extract(doc, base_url, seen),
            Strategy::Fallback => fallback::extract(doc, base_url, seen),
        }
    }
}

/// Runs the strategy chain over one page's markup
///
/// Returns the first non-empty extraction in priority order, with its flags
/// and supplemental passes applied, deduplicated by URL in first-seen order.
/// Header entries are never URL-deduplicated (titles may legitimately repeat
/// across sections).
pub fn extract_nav_links(html: &str, base_url: &Url) -> NavExtraction {
    let doc = Html::parse_document(html);
    let mut seen = HashSet::new();

    for strategy in PRIORITY {
        if !strategy.can_handle(&doc) {
            continue;
        }

        let mut links = strategy.extract(&doc, base_url, &mut seen);
        if links.is_empty() {
            // Claimed the page but found nothing; let the next family try
            continue;
        }

        let mut flags = match strategy {
            Strategy::Mintlify => NavFlags {
                global_nav: true,
                preserves_order: true,
                sparse_nav: false,
            },
            Strategy::Docusaurus | Strategy::ModernGitBook => NavFlags {
                preserves_order: true,
                ..NavFlags::default()
            },
            _ => NavFlags::default(),
        };

        match strategy {
            Strategy::Vocs => {
                // Collapsed sidebars show every section header but few page
                // links. Harvest content links to bootstrap into the hidden
                // sections, and stop trusting extraction order.
                let pages = links.iter().filter(|l| !l.is_header()).count();
                let headers = links.len() - pages;
                if headers > 0 && pages <= headers + 3 {
                    flags.preserves_order = false;
                    flags.sparse_nav = true;
                    links.extend(fallback::extract(&doc, base_url, &mut seen));
                } else {
                    flags.preserves_order = true;
                }
            }
            Strategy::ModernGitBook => {
                // Client-rendered TOCs often ship only a handful of links in
                // the static HTML; supplement from the page body.
                let pages = links.iter().filter(|l| !l.is_header()).count();
                if pages < 10 {
                    links.extend(fallback::extract(&doc, base_url, &mut seen));
                }
            }
            _ => {}
        }

        debug!(
            strategy = ?strategy,
            links = links.len(),
            "navigation extracted"
        );

        return NavExtraction {
            links: dedup_by_url(links),
            flags,
            strategy,
        };
    }

    NavExtraction {
        links: Vec::new(),
        flags: NavFlags::default(),
        strategy: Strategy::Fallback,
    }
}

fn dedup_by_url(links: Vec<NavLink>) -> Vec<NavLink> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|link| match &link.url {
            None => true,
            Some(url) => seen.insert(url.clone()),
        })
        .collect()
}
