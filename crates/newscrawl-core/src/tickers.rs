use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::read_yaml;
use crate::ConfigError;

/// One entry of the ticker list: the company whose coverage is crawled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub company: String,
    pub ticker: String,
    pub sector: String,
}

impl Company {
    #[must_use]
    pub fn new(company: &str, ticker: &str, sector: &str) -> Self {
        Self {
            company: company.to_string(),
            ticker: ticker.to_string(),
            sector: sector.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TickersFile {
    pub tickers: Vec<Company>,
}

/// Load and validate the ticker list from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_tickers(path: &Path) -> Result<TickersFile, ConfigError> {
    let tickers_file: TickersFile = read_yaml(path)?;
    validate_tickers(&tickers_file)?;
    Ok(tickers_file)
}

fn validate_tickers(tickers_file: &TickersFile) -> Result<(), ConfigError> {
    let mut seen_tickers = HashSet::new();

    for entry in &tickers_file.tickers {
        if entry.company.trim().is_empty() {
            return Err(ConfigError::Validation(
                "company name must be non-empty".to_string(),
            ));
        }

        if entry.ticker.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "company '{}' has an empty ticker",
                entry.company
            )));
        }

        if !seen_tickers.insert(entry.ticker.to_uppercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate ticker: '{}'",
                entry.ticker
            )));
        }
    }

    Ok(())
}
