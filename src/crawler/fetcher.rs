//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for a crawl, including:
//! - Building HTTP clients with proper user agent strings and timeouts
//! - GET requests with retry logic for transient failures
//! - Rate-limit (429) handling driven by the server's Retry-After header
//! - Content-Type gating so binary responses never reach the extractors
//!
//! # Retry Logic
//!
//! | Condition | Action |
//! |-----------|--------|
//! | HTTP 429 | Wait Retry-After seconds (exponential fallback), retry |
//! | HTTP 403/404 | Immediate failure, no retry |
//! | HTTP 5xx / other errors | Retry with doubling backoff |
//! | Timeout / network error | Retry with doubling backoff |
//! | Non-HTML Content-Type | Immediate "no content", no retry |
//!
//! Every path increments the attempt counter, so a hostile server cannot
//! hold a crawl forever. Exhausting the budget yields `None` and the caller
//! counts the page as failed.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use tracing::{debug, warn};

use crate::config::{CrawlConfig, UserAgentConfig};
use crate::status::StatusHandle;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `crawl` - Crawl configuration carrying the timeout bounds
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawl: &CrawlConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(crawl.request_timeout_seconds))
        .connect_timeout(Duration::from_secs(crawl.connect_timeout_seconds))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Retrying page fetcher for one crawl
pub struct Fetcher {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
    status: StatusHandle,
}

impl Fetcher {
    pub fn new(client: Client, config: &CrawlConfig, status: StatusHandle) -> Self {
        Fetcher {
            client,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
            status,
        }
    }

    /// Fetches a page expected to be HTML
    ///
    /// Returns `None` when the retry budget is exhausted, the server refuses
    /// the page outright (403/404), or the response is not HTML.
    pub async fn fetch(&self, url: &str) -> Option<String> {
        self.fetch_with(url, true).await
    }

    /// Fetches a pre-rendered Markdown sibling, skipping the HTML gate
    pub async fn fetch_markdown(&self, url: &str) -> Option<String> {
        self.fetch_with(url, false).await
    }

    async fn fetch_with(&self, url: &str, require_html: bool) -> Option<String> {
        let mut attempt = 0;
        let mut delay = self.retry_delay;
        debug!("fetching {}", url);

        while attempt < self.max_retries {
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let wait = retry_after_seconds(&response)
                            .unwrap_or_else(|| delay.as_secs().max(1));
                        warn!("rate limited on {}, waiting {}s", url, wait);
                        self.status.record_rate_limit(wait);
                        tokio::time::sleep(Duration::from_secs(wait)).await;
                        self.status.clear_rate_limit();
                        // Still counts against the budget to guarantee
                        // eventual termination
                        attempt += 1;
                        delay *= 2;
                        continue;
                    }

                    if status == StatusCode::FORBIDDEN || status == StatusCode::NOT_FOUND {
                        warn!("HTTP {} for {}, not retrying", status.as_u16(), url);
                        return None;
                    }

                    if status.is_success() {
                        if require_html && !is_html(&response) {
                            debug!("skipping non-HTML response for {}", url);
                            return None;
                        }
                        match response.text().await {
                            Ok(body) => return Some(body),
                            Err(e) => {
                                warn!("failed to read body for {}: {}", url, e);
                            }
                        }
                    } else {
                        warn!("HTTP {} for {}", status.as_u16(), url);
                    }
                }
                Err(e) => {
                    if e.is_timeout() {
                        warn!("request timeout for {}", url);
                    } else {
                        warn!("request error for {}: {}", url, e);
                    }
                }
            }

            attempt += 1;
            if attempt < self.max_retries {
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }

        None
    }
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.contains("text/html"))
        .unwrap_or(false)
}

fn retry_after_seconds(response: &Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
