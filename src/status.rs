//! Crawl status reporting
//!
//! Each crawl owns one [`CrawlStatus`] behind a [`StatusHandle`]. The crawl
//! task writes through the handle while status pollers take serializable
//! snapshots, so the two sides never share anything but the mutex.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Lifecycle phase of one crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlPhase {
    Idle,
    Downloading,
    Completed,
    Error,
}

impl std::fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CrawlPhase::Idle => "idle",
            CrawlPhase::Downloading => "downloading",
            CrawlPhase::Completed => "completed",
            CrawlPhase::Error => "error",
        };
        f.write_str(name)
    }
}

/// Mutable per-crawl state, readable by pollers as a JSON-serializable snapshot
#[derive(Debug, Clone, Serialize)]
pub struct CrawlStatus {
    pub status: CrawlPhase,
    pub current_page: usize,
    pub total_pages: usize,
    pub current_url: String,
    pub error: Option<String>,
    #[serde(skip)]
    pub start_time: Option<DateTime<Utc>>,
    pub elapsed_seconds: f64,
    pub pages_scraped: Vec<String>,
    pub output_file: Option<String>,
    pub rate_limit_reset: Option<u64>,
    pub failed_pages_count: usize,
    pub log_messages: Vec<String>,
    /// The assembled document, set before the phase flips to completed
    #[serde(skip)]
    pub document: Option<Arc<String>>,
}

impl Default for CrawlStatus {
    fn default() -> Self {
        CrawlStatus {
            status: CrawlPhase::Idle,
            current_page: 0,
            total_pages: 0,
            current_url: String::new(),
            error: None,
            start_time: None,
            elapsed_seconds: 0.0,
            pages_scraped: Vec::new(),
            output_file: None,
            rate_limit_reset: None,
            failed_pages_count: 0,
            log_messages: Vec::new(),
            document: None,
        }
    }
}

/// Shared handle to one crawl's status
#[derive(Debug, Clone, Default)]
pub struct StatusHandle {
    inner: Arc<Mutex<CrawlStatus>>,
}

impl StatusHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CrawlStatus> {
        // A poisoned status lock only means a crawl task panicked; the data
        // is still the best available answer for pollers
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Applies a mutation to the status under the lock
    pub fn update<F: FnOnce(&mut CrawlStatus)>(&self, f: F) {
        f(&mut self.lock());
    }

    /// Takes a point-in-time copy with `elapsed_seconds` brought up to date
    pub fn snapshot(&self) -> CrawlStatus {
        let mut snap = self.lock().clone();
        if let Some(start) = snap.start_time {
            let elapsed = Utc::now().signed_duration_since(start);
            snap.elapsed_seconds = (elapsed.num_milliseconds().max(0) as f64) / 1000.0;
        }
        snap
    }

    /// Marks the crawl as running and records the start time
    pub fn mark_downloading(&self) {
        self.update(|s| {
            s.status = CrawlPhase::Downloading;
            s.start_time = Some(Utc::now());
        });
    }

    pub fn mark_completed(&self) {
        self.update(|s| s.status = CrawlPhase::Completed);
    }

    /// Records the assembled document
    ///
    /// Must happen before [`mark_completed`](Self::mark_completed), so that
    /// anyone observing the completed phase can read the document.
    pub fn store_document(&self, document: String) {
        self.update(|s| s.document = Some(Arc::new(document)));
    }

    /// Phase and document read under one lock
    pub fn phase_and_document(&self) -> (CrawlPhase, Option<Arc<String>>) {
        let status = self.lock();
        (status.status, status.document.clone())
    }

    pub fn mark_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.update(|s| {
            s.status = CrawlPhase::Error;
            s.error = Some(message);
        });
    }

    /// Attaches a non-fatal warning without leaving the current phase
    pub fn attach_warning(&self, message: impl Into<String>) {
        self.update(|s| s.error = Some(message.into()));
    }

    pub fn record_rate_limit(&self, reset_seconds: u64) {
        self.update(|s| s.rate_limit_reset = Some(reset_seconds));
    }

    pub fn clear_rate_limit(&self) {
        self.update(|s| s.rate_limit_reset = None);
    }

    /// Appends to the status log and the tracing output
    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.update(|s| s.log_messages.push(message));
    }

    pub fn phase(&self) -> CrawlPhase {
        self.lock().status
    }
}
