use std::time::Duration;

use serde::Deserialize;

/// Main configuration structure for Docbinder
///
/// Every section is optional in the TOML file; missing sections and fields
/// fall back to their defaults, so running without a config file works.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Delay between page requests (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Maximum fetch attempts per URL
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Initial retry backoff delay, doubled on each attempt (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// Total pages kept before the crawl stops discovering more
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Maximum recursion depth for sub-navigation discovery
    #[serde(rename = "max-subnav-depth")]
    pub max_subnav_depth: usize,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-seconds")]
    pub request_timeout_seconds: u64,

    /// Connect timeout (seconds)
    #[serde(rename = "connect-timeout-seconds")]
    pub connect_timeout_seconds: u64,

    /// Overall wall-clock bound for one crawl (seconds); unset means no bound
    #[serde(rename = "timeout-seconds")]
    pub timeout_seconds: Option<u64>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        CrawlConfig {
            request_delay_ms: 1000,
            max_retries: 3,
            retry_delay_ms: 2000,
            max_pages: 500,
            max_subnav_depth: 5,
            request_timeout_seconds: 30,
            connect_timeout_seconds: 10,
            timeout_seconds: None,
        }
    }
}

impl CrawlConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        UserAgentConfig {
            crawler_name: "Docbinder".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the assembled Markdown file is written to
    #[serde(rename = "output-dir")]
    pub output_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            output_dir: ".".to_string(),
        }
    }
}

/// Per-crawl options assembled from config plus caller choices
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Fetch pre-rendered `.md` siblings instead of converting HTML
    pub native_md: bool,

    /// Restrict the crawl to URLs whose path starts with this prefix
    pub section_scope: Option<String>,

    /// Re-run navigation extraction on each fetched page
    pub follow_subnav: bool,

    pub crawl: CrawlConfig,
    pub user_agent: UserAgentConfig,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        CrawlOptions {
            native_md: false,
            section_scope: None,
            follow_subnav: true,
            crawl: CrawlConfig::default(),
            user_agent: UserAgentConfig::default(),
        }
    }
}

impl CrawlOptions {
    pub fn from_config(config: &Config) -> Self {
        CrawlOptions {
            crawl: config.crawl.clone(),
            user_agent: config.user_agent.clone(),
            ..CrawlOptions::default()
        }
    }
}
