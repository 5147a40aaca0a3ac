//! Reuters: month-windowed site search.

use newscrawl_core::WindowedSourceConfig;

use super::source_fetch;
use crate::crawl::SourceScraper;
use crate::error::CrawlError;
use crate::extract::{Boilerplate, ExtractionProfile, FieldRule};
use crate::fetch::FetchClient;
use crate::parse::ProfileParser;
use crate::search::WindowedSearcher;

pub const SOURCE: &str = "reuters";
pub const BASE_URL: &str = "https://www.reuters.com";

#[must_use]
pub fn profile() -> ExtractionProfile {
    ExtractionProfile::new(&[r#"div[data-testid="article-body"]"#])
        .with_boilerplate(&[Boilerplate::StartsWithIgnoreCase("reporting by")])
        .with_author(&[FieldRule::Text(r#"span[data-testid="AuthorName"]"#)])
        .with_section(&[FieldRule::Text(r#"a[data-testid="section-link"]"#)])
}

/// # Errors
///
/// Returns [`CrawlError::InvalidUrl`] if the configured base URL is not absolute.
pub fn scraper(
    fetch: &FetchClient,
    config: &WindowedSourceConfig,
) -> Result<SourceScraper, CrawlError> {
    let fetch = source_fetch(fetch, config.delay_ms);
    let base_url = config.base_url.as_deref().unwrap_or(BASE_URL);

    let searcher = WindowedSearcher::new(SOURCE, base_url, fetch.clone())?;
    let parser = ProfileParser::new(SOURCE, fetch, profile());
    Ok(SourceScraper::new(SOURCE, Box::new(searcher), Box::new(parser)))
}
