//! Crawl task registry
//!
//! Maps task identifiers to running crawls so status pollers and the result
//! consumer can find them. Each crawl runs in its own tokio task with fully
//! isolated state; the registry map is the only thing shared across crawls,
//! and pollers only ever read snapshots through it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tracing::error;

use crate::config::CrawlOptions;
use crate::crawler::Crawler;
use crate::status::{CrawlPhase, CrawlStatus, StatusHandle};
use crate::{DocbinderError, Result};

static NEXT_TASK: AtomicU64 = AtomicU64::new(1);

/// Opaque handle to one crawl task
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskId(String);

impl TaskId {
    fn next() -> Self {
        TaskId(format!("crawl-{}", NEXT_TASK.fetch_add(1, Ordering::Relaxed)))
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

struct TaskEntry {
    status: StatusHandle,
}

/// Registry of independent, concurrently running crawls
#[derive(Default)]
pub struct CrawlManager {
    tasks: Mutex<HashMap<TaskId, TaskEntry>>,
}

impl CrawlManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TaskId, TaskEntry>> {
        self.tasks.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Spawns a new crawl task and returns its handle
    ///
    /// When the options carry a wall-clock timeout, expiry cancels the
    /// in-flight crawl and marks it as a timeout error; other crawls are
    /// unaffected.
    pub fn start_crawl(&self, url: &str, options: CrawlOptions) -> Result<TaskId> {
        let status = StatusHandle::new();
        let crawler = Crawler::new(url, options.clone(), status.clone())?;

        let task_id = TaskId::next();
        self.lock().insert(
            task_id.clone(),
            TaskEntry {
                status: status.clone(),
            },
        );

        let timeout_seconds = options.crawl.timeout_seconds;
        tokio::spawn(async move {
            let outcome = match timeout_seconds {
                Some(seconds) => {
                    match tokio::time::timeout(Duration::from_secs(seconds), crawler.run()).await
                    {
                        Ok(outcome) => outcome,
                        Err(_) => {
                            let err = DocbinderError::Timeout { seconds };
                            status.mark_error(err.to_string());
                            Err(err)
                        }
                    }
                }
                None => crawler.run().await,
            };

            // The document is already on the status handle by the time the
            // crawl reports success
            if let Err(e) = outcome {
                error!("crawl failed: {}", e);
            }
        });

        Ok(task_id)
    }

    /// Point-in-time status snapshot, or `None` for an unknown task
    pub fn poll_status(&self, task_id: &TaskId) -> Option<CrawlStatus> {
        self.lock().get(task_id).map(|entry| entry.status.snapshot())
    }

    /// The assembled document, valid only once the crawl completed
    pub fn get_result(&self, task_id: &TaskId) -> Result<String> {
        let status = self
            .lock()
            .get(task_id)
            .ok_or_else(|| DocbinderError::UnknownTask(task_id.to_string()))?
            .status
            .clone();

        let (phase, document) = status.phase_and_document();
        match document {
            Some(document) if phase == CrawlPhase::Completed => Ok(document.as_ref().clone()),
            _ => Err(DocbinderError::NotCompleted {
                task_id: task_id.to_string(),
                status: phase.to_string(),
            }),
        }
    }

    /// Drops a finished task from the registry
    pub fn remove(&self, task_id: &TaskId) {
        self.lock().remove(task_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_options() -> CrawlOptions {
        let mut options = CrawlOptions::default();
        options.crawl.request_delay_ms = 0;
        options.crawl.retry_delay_ms = 10;
        options
    }

    async fn single_page_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                "<html><body><article><h1>Home</h1><p>Body.</p></article></body></html>",
                "text/html; charset=utf-8",
            ))
            .mount(&server)
            .await;
        server
    }

    async fn wait_for_terminal(manager: &CrawlManager, id: &TaskId) -> CrawlStatus {
        for _ in 0..200 {
            let snap = manager.poll_status(id).expect("task exists");
            if matches!(snap.status, CrawlPhase::Completed | CrawlPhase::Error) {
                return snap;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!("crawl never reached a terminal state");
    }

    #[tokio::test]
    async fn test_start_poll_and_get_result() {
        let server = single_page_server().await;
        let manager = CrawlManager::new();
        let id = manager.start_crawl(&server.uri(), fast_options()).unwrap();

        let snap = wait_for_terminal(&manager, &id).await;
        assert_eq!(snap.status, CrawlPhase::Completed);

        // A completed phase guarantees the result is already readable
        let markdown = manager.get_result(&id).unwrap();
        assert!(markdown.contains("Body."));
    }

    #[tokio::test]
    async fn test_result_refused_before_completion() {
        let server = single_page_server().await;
        let manager = CrawlManager::new();
        let id = manager.start_crawl(&server.uri(), fast_options()).unwrap();

        // Immediately after start the crawl cannot have finished
        match manager.get_result(&id) {
            Err(DocbinderError::NotCompleted { .. }) => {}
            other => panic!("expected NotCompleted, got {:?}", other.map(|_| ())),
        }
        wait_for_terminal(&manager, &id).await;
    }

    #[tokio::test]
    async fn test_unknown_task_rejected() {
        let manager = CrawlManager::new();
        let bogus = TaskId("crawl-does-not-exist".to_string());
        assert!(manager.poll_status(&bogus).is_none());
        assert!(matches!(
            manager.get_result(&bogus),
            Err(DocbinderError::UnknownTask(_))
        ));
    }

    #[tokio::test]
    async fn test_timeout_marks_error_without_touching_others() {
        let slow = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(
                        "<html><body><article><p>slow</p></article></body></html>",
                        "text/html; charset=utf-8",
                    )
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&slow)
            .await;
        let fast = single_page_server().await;

        let manager = CrawlManager::new();
        let mut slow_options = fast_options();
        slow_options.crawl.timeout_seconds = Some(1);
        let slow_id = manager.start_crawl(&slow.uri(), slow_options).unwrap();
        let fast_id = manager.start_crawl(&fast.uri(), fast_options()).unwrap();

        let slow_snap = wait_for_terminal(&manager, &slow_id).await;
        assert_eq!(slow_snap.status, CrawlPhase::Error);
        assert!(slow_snap.error.as_deref().unwrap().contains("timed out"));

        let fast_snap = wait_for_terminal(&manager, &fast_id).await;
        assert_eq!(fast_snap.status, CrawlPhase::Completed);
        assert!(manager.get_result(&fast_id).is_ok());
    }
}
