use std::path::Path;

use sha2::{Digest, Sha256};

use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Used to detect whether the configuration changed between runs.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"
            [crawl]
            request-delay-ms = 500
            max-retries = 5
            max-pages = 100

            [user-agent]
            crawler-name = "TestBinder"
            crawler-version = "0.1"

            [output]
            output-dir = "/tmp/out"
            "#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.crawl.request_delay_ms, 500);
        assert_eq!(config.crawl.max_retries, 5);
        assert_eq!(config.crawl.max_pages, 100);
        assert_eq!(config.user_agent.crawler_name, "TestBinder");
        assert_eq!(config.output.output_dir, "/tmp/out");
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let file = write_config("[crawl]\nmax-retries = 2\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.crawl.max_retries, 2);
        assert_eq!(config.crawl.request_delay_ms, 1000);
        assert_eq!(config.user_agent.crawler_name, "Docbinder");
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let file = write_config("this is not toml [");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_validation_failure_surfaces() {
        let file = write_config("[crawl]\nmax-retries = 0\n");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_hash_changes_with_content() {
        let a = write_config("[crawl]\nmax-pages = 10\n");
        let b = write_config("[crawl]\nmax-pages = 20\n");
        let hash_a = compute_config_hash(a.path()).unwrap();
        let hash_b = compute_config_hash(b.path()).unwrap();
        assert_ne!(hash_a, hash_b);
        assert_eq!(hash_a.len(), 64);
    }
}
