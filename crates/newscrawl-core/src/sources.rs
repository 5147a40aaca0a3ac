//! Per-source discovery parameters (`config/sources.yaml`).
//!
//! Every source block carries `enabled` plus the parameters its discovery
//! strategy needs. `base_url` and `delay_ms` are optional overrides; the
//! crawler supplies the publisher defaults.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::config::read_yaml;
use crate::ConfigError;

/// Feed-filtering source (the Guardian).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedSourceConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Feed URLs fetched on every search.
    #[serde(default)]
    pub rss: Vec<String>,
    #[serde(default)]
    pub delay_ms: Option<u64>,
    /// Extra search terms per lowercase company name, merged with the
    /// built-in synonym table.
    #[serde(default)]
    pub synonyms: HashMap<String, Vec<String>>,
}

/// Date-bounded site search source (Reuters).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindowedSourceConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub delay_ms: Option<u64>,
}

/// Free-text site search with section index fallback (CNBC, Investopedia).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteSearchSourceConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub delay_ms: Option<u64>,
    /// Section or category slugs scanned when the site search comes back thin.
    #[serde(default, alias = "categories")]
    pub sections: Vec<String>,
    /// Minimum site-search results before the section fallback is skipped.
    #[serde(default)]
    pub min_results: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub guardian: Option<FeedSourceConfig>,
    #[serde(default)]
    pub reuters: Option<WindowedSourceConfig>,
    #[serde(default)]
    pub cnbc: Option<SiteSearchSourceConfig>,
    #[serde(default)]
    pub investopedia: Option<SiteSearchSourceConfig>,
}

impl SourcesConfig {
    /// Names of the sources whose block is present and `enabled: true`.
    #[must_use]
    pub fn enabled_sources(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.guardian.as_ref().is_some_and(|c| c.enabled) {
            names.push("guardian");
        }
        if self.reuters.as_ref().is_some_and(|c| c.enabled) {
            names.push("reuters");
        }
        if self.cnbc.as_ref().is_some_and(|c| c.enabled) {
            names.push("cnbc");
        }
        if self.investopedia.as_ref().is_some_and(|c| c.enabled) {
            names.push("investopedia");
        }
        names
    }

    /// Disable every source whose name is not in `keep`.
    pub fn retain_sources(&mut self, keep: &[String]) {
        let wanted = |name: &str| keep.iter().any(|k| k.eq_ignore_ascii_case(name));
        if !wanted("guardian") {
            self.guardian = None;
        }
        if !wanted("reuters") {
            self.reuters = None;
        }
        if !wanted("cnbc") {
            self.cnbc = None;
        }
        if !wanted("investopedia") {
            self.investopedia = None;
        }
    }
}

/// Load and validate the sources configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources_config(path: &Path) -> Result<SourcesConfig, ConfigError> {
    let config: SourcesConfig = read_yaml(path)?;
    validate_sources(&config)?;
    Ok(config)
}

fn validate_sources(config: &SourcesConfig) -> Result<(), ConfigError> {
    if let Some(guardian) = config.guardian.as_ref().filter(|c| c.enabled) {
        if guardian.rss.is_empty() {
            return Err(ConfigError::Validation(
                "guardian is enabled but has no rss feeds".to_string(),
            ));
        }
    }

    let base_urls = [
        ("reuters", config.reuters.as_ref().and_then(|c| c.base_url.as_deref())),
        ("cnbc", config.cnbc.as_ref().and_then(|c| c.base_url.as_deref())),
        (
            "investopedia",
            config.investopedia.as_ref().and_then(|c| c.base_url.as_deref()),
        ),
    ];
    for (name, base_url) in base_urls {
        if let Some(url) = base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Validation(format!(
                    "{name} base_url must be an absolute http(s) URL, got '{url}'"
                )));
            }
        }
    }

    Ok(())
}
