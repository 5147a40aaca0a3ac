//! Per-publisher wiring: base URLs, card rules, and extraction profiles.
//!
//! Each submodule exposes `SOURCE`, `BASE_URL`, `profile()`, and
//! `scraper(fetch, config)`. Adding a publisher means adding one module and
//! one arm in [`build_scrapers`].

pub mod cnbc;
pub mod guardian;
pub mod investopedia;
pub mod reuters;

use std::collections::BTreeMap;
use std::time::Duration;

use newscrawl_core::SourcesConfig;

use crate::crawl::SourceScraper;
use crate::error::CrawlError;
use crate::fetch::FetchClient;

/// A client using the source's own per-attempt delay when it sets one.
pub(crate) fn source_fetch(fetch: &FetchClient, delay_ms: Option<u64>) -> FetchClient {
    match delay_ms {
        Some(ms) => fetch.with_delay(Duration::from_millis(ms)),
        None => fetch.clone(),
    }
}

/// Build a scraper for every enabled source, keyed by source name.
///
/// # Errors
///
/// Returns [`CrawlError`] if a configured base URL or a built-in pattern is
/// invalid.
pub fn build_scrapers(
    config: &SourcesConfig,
    fetch: &FetchClient,
) -> Result<BTreeMap<String, SourceScraper>, CrawlError> {
    let mut scrapers = BTreeMap::new();

    if let Some(cfg) = config.guardian.as_ref().filter(|c| c.enabled) {
        scrapers.insert(guardian::SOURCE.to_string(), guardian::scraper(fetch, cfg)?);
    }
    if let Some(cfg) = config.reuters.as_ref().filter(|c| c.enabled) {
        scrapers.insert(reuters::SOURCE.to_string(), reuters::scraper(fetch, cfg)?);
    }
    if let Some(cfg) = config.cnbc.as_ref().filter(|c| c.enabled) {
        scrapers.insert(cnbc::SOURCE.to_string(), cnbc::scraper(fetch, cfg)?);
    }
    if let Some(cfg) = config.investopedia.as_ref().filter(|c| c.enabled) {
        scrapers.insert(
            investopedia::SOURCE.to_string(),
            investopedia::scraper(fetch, cfg)?,
        );
    }

    tracing::info!(
        count = scrapers.len(),
        sources = ?scrapers.keys().collect::<Vec<_>>(),
        "initialized sources"
    );
    Ok(scrapers)
}
