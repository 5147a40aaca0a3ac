//! Investopedia: site search, falling back to category pages.

use newscrawl_core::SiteSearchSourceConfig;

use super::source_fetch;
use crate::crawl::SourceScraper;
use crate::error::CrawlError;
use crate::extract::{Boilerplate, ExtractionProfile, FieldRule};
use crate::fetch::FetchClient;
use crate::parse::ProfileParser;
use crate::search::{CardRules, SiteSearchProfile, SiteSearcher};

pub const SOURCE: &str = "investopedia";
pub const BASE_URL: &str = "https://www.investopedia.com";

const DEFAULT_CATEGORY: &str = "news";
// Categories are only scanned when search finds nothing at all.
const DEFAULT_MIN_RESULTS: usize = 1;

#[must_use]
pub fn profile() -> ExtractionProfile {
    ExtractionProfile::new(&[
        "div#article-body_1-0",
        "article",
        r#"div[class*="article-content"]"#,
    ])
    .with_boilerplate(&[
        Boilerplate::StartsWith("Article Sources"),
        Boilerplate::Contains("Investopedia requires writers"),
    ])
    .with_author(&[
        FieldRule::Text(r#"a[rel="author"]"#),
        FieldRule::Text(r#"div[class*="byline"]"#),
        FieldRule::Attr(r#"meta[name="author"]"#, "content"),
    ])
    .with_section(&[
        FieldRule::NthText(r#"nav[aria-label="Breadcrumb"] a"#, 1),
        FieldRule::Attr(r#"meta[property="article:section"]"#, "content"),
    ])
}

#[must_use]
pub fn search_profile() -> SiteSearchProfile {
    let cards = CardRules {
        cards: vec![
            "div.comp.mntl-card-list-items",
            "div.comp.card",
            "a.mntl-card-list-items",
        ],
        titles: vec!["h2", "h3", "h4", "span"],
        link_fallback: r"/(news|articles)/",
        max_items: 20,
    };
    SiteSearchProfile {
        search_path: "search",
        query_param: "q",
        search_cards: cards.clone(),
        article_pattern: None,
        section_cards: cards,
        min_results: DEFAULT_MIN_RESULTS,
    }
}

/// # Errors
///
/// Returns [`CrawlError`] for an invalid base URL.
pub fn scraper(
    fetch: &FetchClient,
    config: &SiteSearchSourceConfig,
) -> Result<SourceScraper, CrawlError> {
    let fetch = source_fetch(fetch, config.delay_ms);
    let base_url = config.base_url.as_deref().unwrap_or(BASE_URL);
    let categories = if config.sections.is_empty() {
        vec![DEFAULT_CATEGORY.to_string()]
    } else {
        config.sections.clone()
    };

    let searcher = SiteSearcher::new(SOURCE, base_url, search_profile(), fetch.clone())?
        .with_sections(categories)
        .with_min_results(config.min_results.unwrap_or(DEFAULT_MIN_RESULTS));
    let parser = ProfileParser::new(SOURCE, fetch, profile());
    Ok(SourceScraper::new(SOURCE, Box::new(searcher), Box::new(parser)))
}
