//! CNBC: site search, falling back to section pages.

use newscrawl_core::SiteSearchSourceConfig;

use super::source_fetch;
use crate::crawl::SourceScraper;
use crate::error::CrawlError;
use crate::extract::{Boilerplate, ExtractionProfile, FieldRule};
use crate::fetch::FetchClient;
use crate::parse::ProfileParser;
use crate::search::{CardRules, SiteSearchProfile, SiteSearcher};

pub const SOURCE: &str = "cnbc";
pub const BASE_URL: &str = "https://www.cnbc.com";

const DEFAULT_MIN_RESULTS: usize = 5;

#[must_use]
pub fn profile() -> ExtractionProfile {
    ExtractionProfile::new(&[
        r#"div[class*="ArticleBody"]"#,
        r#"div[itemprop="articleBody"]"#,
        "article",
    ])
    .with_boilerplate(&[
        Boilerplate::StartsWith("WATCH LIVE"),
        Boilerplate::Contains("Subscribe to CNBC"),
    ])
    .with_block_fallback(r#"div[class*="group"], div[class*="Group"]"#, 50)
    .with_author(&[
        FieldRule::Text(r#"a[rel="author"]"#),
        FieldRule::Text(r#"div[class*="Author-"] a"#),
        FieldRule::Attr(r#"meta[name="author"]"#, "content"),
    ])
    .with_section(&[
        FieldRule::Attr(r#"meta[property="article:section"]"#, "content"),
        FieldRule::NthText(
            r#"div[class*="breadcrumb"] a, div[class*="Breadcrumb"] a"#,
            0,
        ),
    ])
}

#[must_use]
pub fn search_profile() -> SiteSearchProfile {
    SiteSearchProfile {
        search_path: "search/",
        query_param: "query",
        search_cards: CardRules {
            cards: vec![
                r#"div[class*="SearchResult"]"#,
                r#"div[class*="Card"]"#,
                "div.Card-titleContainer",
            ],
            titles: vec!["h3", "h2", "a"],
            link_fallback: r"/2\d{3}/.*\.html",
            max_items: 20,
        },
        article_pattern: Some(r"/20\d{2}/"),
        section_cards: CardRules {
            cards: vec![r#"div[class*="Card"]"#],
            titles: vec!["h2", "h3", "h4"],
            link_fallback: r"\.html",
            max_items: 30,
        },
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

    let searcher = SiteSearcher::new(SOURCE, base_url, search_profile(), fetch.clone())?
        .with_sections(config.sections.clone())
        .with_min_results(config.min_results.unwrap_or(DEFAULT_MIN_RESULTS));
    let parser = ProfileParser::new(SOURCE, fetch, profile());
    Ok(SourceScraper::new(SOURCE, Box::new(searcher), Box::new(parser)))
}
