//! Docbinder: a documentation site downloader
//!
//! This crate crawls a documentation website (GitBook, Docusaurus, Mintlify,
//! Vocs and similar template families, plus a generic fallback), discovers its
//! navigable page set, strips boilerplate from each page, converts the content
//! to Markdown and assembles a single ordered document with a generated table
//! of contents.

pub mod assemble;
pub mod config;
pub mod content;
pub mod crawler;
pub mod nav;
pub mod status;
pub mod tasks;
pub mod url;

use thiserror::Error;

/// Main error type for Docbinder operations
#[derive(Debug, Error)]
pub enum DocbinderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to fetch main page: {url}")]
    RootFetch { url: String },

    #[error("no pages were successfully scraped")]
    NoPages,

    #[error("crawl timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Markdown conversion error for {url}: {message}")]
    Convert { url: String, message: String },

    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("Task {task_id} is not completed (status: {status})")]
    NotCompleted { task_id: String, status: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Docbinder operations
pub type Result<T> = std::result::Result<T, DocbinderError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{CrawlConfig, CrawlOptions};
pub use crawler::Crawler;
pub use nav::NavLink;
pub use status::{CrawlPhase, CrawlStatus, StatusHandle};
pub use tasks::{CrawlManager, TaskId};
