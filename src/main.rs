//! Docbinder main entry point
//!
//! Command-line interface that crawls one documentation site and writes the
//! assembled Markdown document to disk.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use url::Url;

use docbinder::config::{load_config_with_hash, Config, CrawlOptions};
use docbinder::status::StatusHandle;
use docbinder::{Crawler, DocbinderError};

/// Docbinder: a documentation site downloader
///
/// Docbinder crawls a documentation website, discovers its page set from the
/// site navigation, converts every page to Markdown and binds the result into
/// a single ordered document with a table of contents.
#[derive(Parser, Debug)]
#[command(name = "docbinder")]
#[command(version)]
#[command(about = "Download a documentation site as one Markdown file", long_about = None)]
struct Cli {
    /// Base URL of the documentation site
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Fetch pre-rendered .md siblings instead of converting HTML
    #[arg(long)]
    native_md: bool,

    /// Only crawl pages under this path prefix, e.g. /guides
    #[arg(long, value_name = "PATH")]
    section: Option<String>,

    /// Do not follow navigation found on fetched pages
    #[arg(long)]
    no_subnav: bool,

    /// Directory the output file is written to (overrides config)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Abort the crawl after this many seconds (overrides config)
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let mut output_dir = PathBuf::from(&config.output.output_dir);
    if let Some(dir) = &cli.output_dir {
        output_dir = dir.clone();
    }

    let mut options = CrawlOptions::from_config(&config);
    options.native_md = cli.native_md;
    options.section_scope = cli.section.clone();
    options.follow_subnav = !cli.no_subnav;
    if cli.timeout.is_some() {
        options.crawl.timeout_seconds = cli.timeout;
    }

    let status = StatusHandle::new();
    let crawler = Crawler::new(&cli.url, options.clone(), status.clone())?;

    let markdown = match options.crawl.timeout_seconds {
        Some(seconds) => {
            match tokio::time::timeout(Duration::from_secs(seconds), crawler.run()).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    let err = DocbinderError::Timeout { seconds };
                    status.mark_error(err.to_string());
                    Err(err)
                }
            }
        }
        None => crawler.run().await,
    }?;

    let path = output_dir.join(output_filename(&cli.url));
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;
    std::fs::write(&path, markdown.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    status.update(|s| s.output_file = Some(path.display().to_string()));

    let snap = status.snapshot();
    tracing::info!(
        "Crawl finished: {} pages in {:.1}s",
        snap.pages_scraped.len(),
        snap.elapsed_seconds
    );
    if snap.failed_pages_count > 0 {
        tracing::warn!("{} page(s) failed to download or extract", snap.failed_pages_count);
    }
    println!("Wrote {}", path.display());

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("docbinder=info,warn"),
            1 => EnvFilter::new("docbinder=debug,info"),
            2 => EnvFilter::new("docbinder=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Derives a timestamped output filename from the site host
fn output_filename(url: &str) -> String {
    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| "docs".to_string());
    let host: String = host
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!(
        "{}-docs-{}.md",
        host.trim_matches('-'),
        chrono::Utc::now().format("%Y%m%d-%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_filename_uses_host() {
        let name = output_filename("https://docs.example.com/guide");
        assert!(name.starts_with("docs-example-com-docs-"));
        assert!(name.ends_with(".md"));
    }

    #[test]
    fn test_output_filename_falls_back_for_bad_url() {
        let name = output_filename("not a url");
        assert!(name.starts_with("docs-"));
    }
}
