use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::config::read_yaml;
use crate::ConfigError;

/// Top-level shape of `config/crawler.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    pub crawler: CrawlerSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerSettings {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub output: OutputSettings,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default = "default_max_concurrent_companies")]
    pub max_concurrent_companies: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    pub path: PathBuf,
}

/// Fetch policy shared by every source unless a source overrides `delay_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Minimum spacing between requests to one host across all workers.
    /// `0` leaves pacing to `delay_ms` alone.
    #[serde(default)]
    pub per_host_interval_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
            user_agent: None,
            per_host_interval_ms: 0,
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    1_000
}

fn default_max_concurrent_companies() -> usize {
    1
}

/// Load and validate the crawler settings from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_crawler_config(path: &Path) -> Result<CrawlerConfig, ConfigError> {
    let config: CrawlerConfig = read_yaml(path)?;
    validate_crawler(&config)?;
    Ok(config)
}

fn validate_crawler(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let settings = &config.crawler;

    if settings.start_date > settings.end_date {
        return Err(ConfigError::Validation(format!(
            "start_date {} is after end_date {}",
            settings.start_date, settings.end_date
        )));
    }

    if settings.http.max_attempts == 0 {
        return Err(ConfigError::Validation(
            "http.max_attempts must be at least 1".to_string(),
        ));
    }

    if settings.http.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "http.timeout_secs must be at least 1".to_string(),
        ));
    }

    if settings.max_concurrent_companies == 0 {
        return Err(ConfigError::Validation(
            "max_concurrent_companies must be at least 1".to_string(),
        ));
    }

    Ok(())
}
