//! Crawl orchestration
//!
//! The [`Crawler`] owns all mutable state for one crawl: the visited-URL
//! set, the page table, and the content-hash table used for duplicate
//! detection. One crawl runs as a single sequential async task; the enforced
//! inter-request delay and retry backoff are the only suspension points, so
//! none of this state needs synchronization.
//!
//! # State machine
//!
//! `idle -> downloading -> completed | error`. Failing to fetch the root
//! page, or finishing with zero kept pages, is fatal. Everything else (bad
//! pages, failed fetches, extraction misses) degrades to a failed-page count
//! surfaced as a non-fatal warning on the final status.

pub mod fetcher;

pub use fetcher::{build_http_client, Fetcher};

use std::collections::{HashMap, HashSet};

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use url::Url;

use crate::assemble;
use crate::config::CrawlOptions;
use crate::content;
use crate::nav::{self, NavFlags, NavLink};
use crate::status::StatusHandle;
use crate::url::{is_different_doc_section, is_different_version_path};
use crate::{DocbinderError, Result};

/// One crawled document entry
///
/// Header entries (`url = None`) carry no content and exist only to group
/// pages in the assembled table of contents.
#[derive(Debug, Clone)]
pub struct Page {
    /// Monotonic discovery order
    pub index: usize,
    /// Nesting depth within the site navigation
    pub depth: usize,
    pub title: String,
    pub content: Option<String>,
    pub url: Option<String>,
    /// The URL actually fetched (differs from `url` in native-Markdown mode)
    pub source_url: String,
}

/// Mutable state for one crawl invocation
#[derive(Debug, Default)]
struct CrawlState {
    visited: HashSet<String>,
    pages: Vec<Page>,
    content_hashes: HashMap<String, usize>,
    next_index: usize,
    failed_pages: usize,
    flags: NavFlags,
}

impl CrawlState {
    fn push_header(&mut self, title: String, depth: usize) {
        self.pages.push(Page {
            index: self.next_index,
            depth,
            title,
            content: None,
            url: None,
            source_url: String::new(),
        });
        self.next_index += 1;
    }

    /// A URL reached again at a greater depth takes the deeper value; depth
    /// never decreases
    fn reconcile_depth(&mut self, url: &str, depth: usize) {
        if let Some(page) = self
            .pages
            .iter_mut()
            .find(|p| p.url.as_deref() == Some(url))
        {
            if depth > page.depth {
                debug!("deepening {} from {} to {}", url, page.depth, depth);
                page.depth = depth;
            }
        }
    }
}

/// Sequential documentation-site crawler
pub struct Crawler {
    base_url: Url,
    options: CrawlOptions,
    fetcher: Fetcher,
    status: StatusHandle,
}

impl Crawler {
    /// Creates a crawler for one base URL
    ///
    /// The base URL keeps a trailing slash so relative links resolve under
    /// it rather than next to it.
    pub fn new(url: &str, options: CrawlOptions, status: StatusHandle) -> Result<Self> {
        let base_url = Url::parse(&format!("{}/", url.trim_end_matches('/')))?;
        let client = build_http_client(&options.user_agent, &options.crawl)?;
        let fetcher = Fetcher::new(client, &options.crawl, status.clone());
        Ok(Crawler {
            base_url,
            options,
            fetcher,
            status,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Runs the crawl to completion and returns the assembled document
    ///
    /// All failure paths are recorded on the status before returning.
    pub async fn run(&self) -> Result<String> {
        self.status.mark_downloading();
        info!("starting crawl of {}", self.base_url);

        match self.crawl().await {
            Ok(markdown) => Ok(markdown),
            Err(e) => {
                self.status.mark_error(e.to_string());
                Err(e)
            }
        }
    }

    async fn crawl(&self) -> Result<String> {
        let mut state = CrawlState::default();

        let Some(root_html) = self.fetcher.fetch(self.base_url.as_str()).await else {
            return Err(DocbinderError::RootFetch {
                url: self.base_url.to_string(),
            });
        };

        let extraction = nav::extract_nav_links(&root_html, &self.base_url);
        state.flags = extraction.flags;
        info!(
            "extracted {} navigation links via {:?}",
            extraction.links.len(),
            extraction.strategy
        );

        if state.flags.global_nav {
            // The root page appears inside a global navigation list, so it
            // is fetched like any other page
            self.status
                .update(|s| s.total_pages = extraction.links.len());
            self.follow_nav_links(&mut state, &extraction.links, 0)
                .await;
        } else {
            self.status
                .update(|s| s.total_pages = extraction.links.len() + 1);
            self.process_root(&mut state, &root_html);
            self.follow_nav_links(&mut state, &extraction.links, 0)
                .await;
        }

        let markdown = assemble::generate_markdown(&state.pages, state.flags);
        if markdown.is_empty() {
            return Err(DocbinderError::NoPages);
        }

        // Pollers that see the completed phase must find the document
        self.status.store_document(markdown.clone());
        self.status.mark_completed();
        self.status
            .update(|s| s.failed_pages_count = state.failed_pages);
        if state.failed_pages > 0 {
            self.status.attach_warning(format!(
                "{} page(s) failed to download or extract",
                state.failed_pages
            ));
        }

        info!(
            "crawl finished: {} entries, {} failed",
            state.pages.len(),
            state.failed_pages
        );
        Ok(markdown)
    }

    /// Processes the root page as page #0 for sites without global nav
    fn process_root(&self, state: &mut CrawlState, root_html: &str) {
        let extracted = content::extract_page(root_html, self.base_url.as_str());
        if extracted.markdown.is_empty() {
            state.failed_pages += 1;
            return;
        }

        let normalized = self.base_url.as_str().trim_end_matches('/').to_string();
        let hash = content_hash(&extracted.markdown);
        let index = state.next_index;
        state.pages.push(Page {
            index,
            depth: 0,
            title: extracted.title.clone(),
            content: Some(extracted.markdown),
            url: Some(normalized.clone()),
            source_url: normalized.clone(),
        });
        state.content_hashes.insert(hash, index);
        state.next_index += 1;
        state.visited.insert(normalized);
        self.status
            .update(|s| s.pages_scraped.push(extracted.title));
    }

    /// Walks a NavLink list depth-first, fetching and recursing in order
    ///
    /// Per-link failures never abort the walk. Returns when the list is
    /// exhausted or the page cap is reached.
    async fn follow_nav_links(
        &self,
        state: &mut CrawlState,
        links: &[NavLink],
        subnav_depth: usize,
    ) {
        for link in links {
            if state.pages.len() >= self.options.crawl.max_pages {
                warn!(
                    "page cap of {} reached, stopping discovery",
                    self.options.crawl.max_pages
                );
                return;
            }

            let Some(url) = &link.url else {
                // Bare headers under a section-only crawl may describe
                // parent categories outside the restricted scope
                if self.options.section_scope.is_none() {
                    state.push_header(link.title.clone(), link.depth);
                }
                continue;
            };

            if state.visited.contains(url) {
                state.reconcile_depth(url, link.depth);
                continue;
            }

            if is_different_version_path(url, self.base_url.as_str()) {
                debug!("skipping different version tree: {}", url);
                continue;
            }
            if is_different_doc_section(url, self.base_url.as_str()) {
                debug!("skipping different doc section: {}", url);
                continue;
            }
            if !self.in_section_scope(url) {
                debug!("outside section scope: {}", url);
                continue;
            }

            self.status.update(|s| {
                s.current_page = state.next_index;
                s.current_url = url.clone();
            });

            tokio::time::sleep(self.options.crawl.request_delay()).await;

            let fetched = self.fetcher.fetch(url).await;
            // Mark visited regardless of outcome so one crawl never loops
            // over a persistently failing URL
            state.visited.insert(url.clone());

            let Some(html) = fetched else {
                state.failed_pages += 1;
                self.status
                    .update(|s| s.failed_pages_count = state.failed_pages);
                continue;
            };

            let (extracted_title, markdown, source_url) = if self.options.native_md {
                let md_url = format!("{}.md", url);
                match self.fetcher.fetch_markdown(&md_url).await {
                    Some(md) => (link.title.clone(), md, md_url),
                    None => {
                        state.failed_pages += 1;
                        continue;
                    }
                }
            } else {
                let extracted = content::extract_page(&html, url);
                (extracted.title, extracted.markdown, url.clone())
            };

            if markdown.trim().is_empty() {
                state.failed_pages += 1;
                self.status
                    .update(|s| s.failed_pages_count = state.failed_pages);
                continue;
            }

            let hash = content_hash(&markdown);
            if state.content_hashes.contains_key(&hash) {
                debug!("duplicate content at {}, dropping", url);
                continue;
            }

            // Navigation labels are usually better section names than
            // on-page h1s
            let title = if link.title.is_empty() {
                extracted_title
            } else {
                link.title.clone()
            };

            let index = state.next_index;
            state.pages.push(Page {
                index,
                depth: link.depth,
                title: title.clone(),
                content: Some(markdown),
                url: Some(url.clone()),
                source_url,
            });
            state.content_hashes.insert(hash, index);
            state.next_index += 1;
            self.status.update(|s| s.pages_scraped.push(title));

            // Per-page sub-navigation catches collapsible menus invisible
            // on the root page; global-nav sites have nothing new to find
            if !state.flags.global_nav
                && self.options.follow_subnav
                && subnav_depth < self.options.crawl.max_subnav_depth
            {
                let sub = nav::extract_nav_links(&html, &self.base_url);
                let sub_links: Vec<NavLink> = if state.flags.sparse_nav {
                    // Local sub-nav headers do not reflect the site's real
                    // top-level structure
                    sub.links.into_iter().filter(|l| !l.is_header()).collect()
                } else {
                    sub.links
                };
                Box::pin(self.follow_nav_links(state, &sub_links, subnav_depth + 1)).await;
            }
        }
    }

    fn in_section_scope(&self, url: &str) -> bool {
        let Some(prefix) = &self.options.section_scope else {
            return true;
        };
        Url::parse(url)
            .map(|parsed| parsed.path().starts_with(prefix.as_str()))
            .unwrap_or(false)
    }
}

/// Stable digest of cleaned page Markdown, used for duplicate detection
fn content_hash(markdown: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(markdown.as_bytes());
    hex::encode(hasher.finalize())
}
