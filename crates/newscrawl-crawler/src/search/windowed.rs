//! Date-bounded site search, one query per calendar month.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Url;
use scraper::{Html, Selector};

use super::{dedup_by_url, parse_base_url, resolve_link, usable_title, Search};
use crate::dates::parse_iso_date;
use crate::error::CrawlError;
use crate::extract::normalize_whitespace;
use crate::fetch::FetchClient;
use crate::types::{ArticleMeta, DateWindow};
use crate::windows::split_date_range;

const SEARCH_PATH: &str = "site-search/";
const RESULT_CARD: &str = "li.search-result-indiv";

/// Site search that accepts an explicit date range, queried window by
/// window so every month gets its own result page.
#[derive(Debug, Clone)]
pub struct WindowedSearcher {
    source: String,
    base_url: Url,
    fetch: FetchClient,
}

struct ResultCard {
    url: String,
    title: String,
    published_at: DateTime<Utc>,
}

impl WindowedSearcher {
    /// # Errors
    ///
    /// Returns [`CrawlError::InvalidUrl`] if `base_url` is not absolute.
    pub fn new(source: &str, base_url: &str, fetch: FetchClient) -> Result<Self, CrawlError> {
        Ok(Self {
            source: source.to_string(),
            base_url: parse_base_url(base_url)?,
            fetch,
        })
    }

    fn search_url(&self) -> Result<Url, CrawlError> {
        self.base_url
            .join(SEARCH_PATH)
            .map_err(|e| CrawlError::InvalidUrl {
                url: format!("{}{SEARCH_PATH}", self.base_url),
                reason: e.to_string(),
            })
    }

    async fn search_window(&self, company: &str, window: DateWindow) -> Vec<ArticleMeta> {
        let url = match self.search_url() {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(source = %self.source, error = %e, "cannot build search URL");
                return Vec::new();
            }
        };
        let start = window.start.format("%Y-%m-%d").to_string();
        let end = window.end.format("%Y-%m-%d").to_string();
        let params = [
            ("query", company),
            ("dateRange", "custom"),
            ("startDate", start.as_str()),
            ("endDate", end.as_str()),
        ];

        let Some(html) = self.fetch.get_with_params(url.as_str(), &params).await else {
            tracing::warn!(source = %self.source, company, %start, %end, "empty search result");
            return Vec::new();
        };

        let results: Vec<ArticleMeta> = parse_result_cards(&html, &self.base_url)
            .into_iter()
            .map(|card| {
                ArticleMeta::new(card.url, card.title, Some(card.published_at), &self.source)
                    .with_window(company, window)
            })
            .collect();

        tracing::debug!(
            source = %self.source,
            company,
            %start,
            %end,
            count = results.len(),
            "window searched"
        );
        results
    }
}

/// Cards lacking a link, a heading, or a parseable timestamp are skipped.
fn parse_result_cards(html: &str, base: &Url) -> Vec<ResultCard> {
    let (Ok(card_sel), Ok(link_sel), Ok(title_sel), Ok(time_sel)) = (
        Selector::parse(RESULT_CARD),
        Selector::parse("a[href]"),
        Selector::parse("h3"),
        Selector::parse("time[datetime]"),
    ) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    document
        .select(&card_sel)
        .filter_map(|card| {
            let href = card.select(&link_sel).next()?.value().attr("href")?;
            let title = normalize_whitespace(&card.select(&title_sel).next()?.text().collect::<String>());
            let raw_time = card.select(&time_sel).next()?.value().attr("datetime")?;

            let url = resolve_link(base, href)?;
            let published_at = parse_iso_date(raw_time)?;
            usable_title(&title).then_some(ResultCard {
                url,
                title,
                published_at,
            })
        })
        .collect()
}

#[async_trait]
impl Search for WindowedSearcher {
    async fn search(
        &self,
        company: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ArticleMeta>, CrawlError> {
        tracing::info!(source = %self.source, company, %start, %end, "searching by window");

        let mut all = Vec::new();
        for window in split_date_range(start, end) {
            all.extend(self.search_window(company, window).await);
        }

        let total = all.len();
        let unique = dedup_by_url(all);
        tracing::info!(
            source = %self.source,
            company,
            total,
            unique = unique.len(),
            "windowed search completed"
        );
        Ok(unique)
    }
}
