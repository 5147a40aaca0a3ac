//! The Guardian: section RSS feeds filtered by company mention.

use newscrawl_core::FeedSourceConfig;

use super::source_fetch;
use crate::crawl::SourceScraper;
use crate::error::CrawlError;
use crate::extract::{Boilerplate, ExtractionProfile, FieldRule};
use crate::feed::FeedParser;
use crate::fetch::FetchClient;
use crate::parse::ProfileParser;
use crate::search::FeedFilterSearcher;

pub const SOURCE: &str = "guardian";
pub const BASE_URL: &str = "https://www.theguardian.com";

const BREADCRUMB_LINK: &str = r#"nav[aria-label="Breadcrumb"] a"#;

#[must_use]
pub fn profile() -> ExtractionProfile {
    ExtractionProfile::new(&["div#maincontent", "article"])
        .with_boilerplate(&[
            Boilerplate::StartsWith("Topics"),
            Boilerplate::StartsWith("Reuse this content"),
        ])
        .with_author(&[
            FieldRule::Attr(r#"meta[name="author"]"#, "content"),
            FieldRule::Text(r#"a[rel="author"]"#),
            FieldRule::Text(r#"span[itemprop="name"]"#),
        ])
        .with_section(&[
            FieldRule::NthText(BREADCRUMB_LINK, 0),
            FieldRule::Attr(r#"meta[property="article:section"]"#, "content"),
        ])
}

#[must_use]
pub fn searcher(fetch: FetchClient, config: &FeedSourceConfig) -> FeedFilterSearcher {
    FeedFilterSearcher::new(SOURCE, config.rss.clone(), FeedParser::new(fetch))
        .with_synonyms(config.synonyms.clone())
}

/// # Errors
///
/// Infallible today; returns `Result` to match the other sources.
pub fn scraper(
    fetch: &FetchClient,
    config: &FeedSourceConfig,
) -> Result<SourceScraper, CrawlError> {
    let fetch = source_fetch(fetch, config.delay_ms);
    let searcher = searcher(fetch.clone(), config);
    let parser = ProfileParser::new(SOURCE, fetch, profile());
    Ok(SourceScraper::new(SOURCE, Box::new(searcher), Box::new(parser)))
}
