//! Search by filtering syndication feeds for company mentions.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Url;

use super::{dedup_by_url, resolve_link, usable_title, Search};
use crate::error::CrawlError;
use crate::feed::FeedParser;
use crate::types::{ArticleMeta, FeedItem};

/// Built-in alternate terms for well-known companies, keyed by lowercase name.
#[must_use]
pub fn curated_synonyms(company_lower: &str) -> &'static [&'static str] {
    match company_lower {
        "apple" => &["iphone", "ipad", "mac", "tim cook"],
        "microsoft" => &["windows", "azure", "satya nadella"],
        "tesla" => &["elon musk", "electric vehicle"],
        "amazon" => &["aws", "jeff bezos", "andy jassy"],
        _ => &[],
    }
}

/// Pulls a fixed list of feeds and keeps the items mentioning a company.
///
/// Feeds only carry recent items, so old ranges simply come back empty.
#[derive(Debug, Clone)]
pub struct FeedFilterSearcher {
    source: String,
    feeds: Vec<String>,
    parser: FeedParser,
    extra_synonyms: HashMap<String, Vec<String>>,
}

impl FeedFilterSearcher {
    #[must_use]
    pub fn new(source: &str, feeds: Vec<String>, parser: FeedParser) -> Self {
        Self {
            source: source.to_string(),
            feeds,
            parser,
            extra_synonyms: HashMap::new(),
        }
    }

    /// Add configured synonyms on top of the curated table. Keys are matched
    /// case-insensitively against the company name.
    #[must_use]
    pub fn with_synonyms(mut self, synonyms: HashMap<String, Vec<String>>) -> Self {
        self.extra_synonyms = synonyms
            .into_iter()
            .map(|(company, terms)| {
                let terms = terms
                    .into_iter()
                    .map(|t| t.trim().to_lowercase())
                    .filter(|t| !t.is_empty())
                    .collect();
                (company.to_lowercase(), terms)
            })
            .collect();
        self
    }

    /// Lowercase terms whose presence marks an item as relevant.
    #[must_use]
    pub fn search_terms(&self, company: &str) -> Vec<String> {
        let company_lower = company.trim().to_lowercase();
        let mut terms = vec![company_lower.clone()];
        terms.extend(
            curated_synonyms(&company_lower)
                .iter()
                .map(|term| (*term).to_string()),
        );
        if let Some(extra) = self.extra_synonyms.get(&company_lower) {
            terms.extend(extra.iter().cloned());
        }
        let mut seen = HashSet::new();
        terms.retain(|term| seen.insert(term.clone()));
        terms
    }

    async fn fetch_all(&self) -> Vec<(Url, FeedItem)> {
        let mut all = Vec::new();
        for feed in &self.feeds {
            let Ok(feed_url) = Url::parse(feed) else {
                tracing::warn!(source = %self.source, feed, "skipping unparseable feed URL");
                continue;
            };
            let items = self.parser.parse_feed(feed).await;
            all.extend(items.into_iter().map(|item| (feed_url.clone(), item)));
        }
        tracing::info!(source = %self.source, count = all.len(), "feed items fetched");
        all
    }

    fn to_meta(&self, feed_url: &Url, item: FeedItem) -> Option<ArticleMeta> {
        let url = resolve_link(feed_url, &item.link)?;
        let title = item.title.trim().to_string();
        if !usable_title(&title) {
            return None;
        }
        Some(ArticleMeta::new(url, title, item.published_at, &self.source))
    }

    /// The newest `limit` items across every feed, undated items last.
    pub async fn latest(&self, limit: usize) -> Vec<ArticleMeta> {
        let mut items = self.fetch_all().await;
        items.sort_by_key(|(_, item)| Reverse(item.published_at));

        let candidates = items
            .into_iter()
            .filter_map(|(feed_url, item)| self.to_meta(&feed_url, item))
            .collect();
        let mut latest = dedup_by_url(candidates);
        latest.truncate(limit);
        latest
    }
}

fn mentions_any(item: &FeedItem, terms: &[String]) -> bool {
    let title = item.title.to_lowercase();
    let description = item
        .description
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_default();
    terms
        .iter()
        .any(|term| title.contains(term.as_str()) || description.contains(term.as_str()))
}

#[async_trait]
impl Search for FeedFilterSearcher {
    async fn search(
        &self,
        company: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ArticleMeta>, CrawlError> {
        tracing::info!(source = %self.source, company, %start, %end, "searching feeds");

        let terms = self.search_terms(company);
        let items = self.fetch_all().await;
        let total = items.len();

        let candidates = items
            .into_iter()
            .filter(|(_, item)| mentions_any(item, &terms))
            .filter(|(_, item)| match item.published_at {
                Some(ts) => {
                    let day = ts.date_naive();
                    let in_range = start <= day && day <= end;
                    if !in_range {
                        tracing::debug!(title = %item.title, %day, "feed item outside date range");
                    }
                    in_range
                }
                None => true,
            })
            .filter_map(|(feed_url, item)| self.to_meta(&feed_url, item))
            .collect();
        let results = dedup_by_url(candidates);

        tracing::info!(
            source = %self.source,
            company,
            total,
            matched = results.len(),
            "feed search completed"
        );
        Ok(results)
    }
}
