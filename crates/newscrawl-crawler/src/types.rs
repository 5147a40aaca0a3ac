use chrono::{DateTime, NaiveDate, Utc};
use newscrawl_core::Company;
use serde::Serialize;

/// An inclusive `[start, end]` date range used for one bounded search query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A search candidate: an article URL that has not been parsed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleMeta {
    pub url: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    /// `true` when the source gave no usable timestamp and `published_at`
    /// is the crawl time.
    pub published_estimated: bool,
    pub source: String,
    pub search_query: Option<String>,
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
}

impl ArticleMeta {
    /// Build a candidate, stamping it with the current time when no
    /// timestamp was found.
    #[must_use]
    pub fn new(
        url: String,
        title: String,
        published_at: Option<DateTime<Utc>>,
        source: &str,
    ) -> Self {
        let published_estimated = published_at.is_none();
        Self {
            url,
            title,
            published_at: published_at.unwrap_or_else(Utc::now),
            published_estimated,
            source: source.to_string(),
            search_query: None,
            window_start: None,
            window_end: None,
        }
    }

    #[must_use]
    pub fn with_window(mut self, query: &str, window: DateWindow) -> Self {
        self.search_query = Some(query.to_string());
        self.window_start = Some(window.start);
        self.window_end = Some(window.end);
        self
    }
}

/// The extracted body of one fetched article page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleContent {
    pub url: String,
    pub body_text: String,
    pub author: Option<String>,
    pub section: Option<String>,
    pub language: String,
    pub raw_html: Option<String>,
}

impl ArticleContent {
    #[must_use]
    pub fn new(url: &str, body_text: String) -> Self {
        Self {
            url: url.to_string(),
            body_text,
            author: None,
            section: None,
            language: "en".to_string(),
            raw_html: None,
        }
    }
}

/// A fully assembled article record handed to the exporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub url: String,
    pub title: String,
    pub body_text: String,
    pub published_at: DateTime<Utc>,
    pub published_estimated: bool,
    pub source: String,
    pub company: String,
    pub ticker: String,
    pub sector: String,
    pub author: Option<String>,
    pub section: Option<String>,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_end: Option<NaiveDate>,
}

impl Article {
    /// Join a candidate with its parsed content under the given crawl context.
    ///
    /// `source` is the scraper's fixed tag and wins over the candidate's.
    #[must_use]
    pub fn assemble(
        meta: ArticleMeta,
        content: ArticleContent,
        company: &Company,
        source: &str,
    ) -> Self {
        Self {
            url: meta.url,
            title: meta.title,
            body_text: content.body_text,
            published_at: meta.published_at,
            published_estimated: meta.published_estimated,
            source: source.to_string(),
            company: company.company.clone(),
            ticker: company.ticker.clone(),
            sector: company.sector.clone(),
            author: content.author,
            section: content.section,
            language: content.language,
            search_query: meta.search_query,
            window_start: meta.window_start,
            window_end: meta.window_end,
        }
    }
}

/// One entry of a syndication feed, dialect-independent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub author: Option<String>,
    pub category: Option<String>,
}
