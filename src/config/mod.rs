//! Configuration module for Docbinder
//!
//! Handles loading, parsing, and validating TOML configuration files, plus
//! the per-crawl [`CrawlOptions`] assembled from config and caller choices.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use docbinder::config::load_config;
//!
//! let config = load_config(Path::new("docbinder.toml")).unwrap();
//! println!("Request delay: {}ms", config.crawl.request_delay_ms);
//! ```

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{Config, CrawlConfig, CrawlOptions, OutputConfig, UserAgentConfig};
