//! Free-text site search with a section-index fallback.
//!
//! Card discovery is data: each source supplies [`CardRules`] describing
//! which elements are result cards, how to find a link and a title inside
//! one, and which bare links count as articles when no card matches.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use super::{dedup_by_url, parse_base_url, resolve_link, usable_title, Search};
use crate::dates::parse_any_date;
use crate::error::CrawlError;
use crate::extract::normalize_whitespace;
use crate::fetch::FetchClient;
use crate::types::ArticleMeta;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRules {
    /// Every selector contributes its matches, in order.
    pub cards: Vec<&'static str>,
    /// Title lookup inside a card; the card's link text is the last resort.
    pub titles: Vec<&'static str>,
    /// When no card matches, anchors whose `href` matches this pattern are
    /// treated as cards.
    pub link_fallback: &'static str,
    /// Cap on distinct usable cards kept from one page.
    pub max_items: usize,
}

/// Everything a [`SiteSearcher`] needs to know about one site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSearchProfile {
    /// Appended to the base URL, e.g. `search/`.
    pub search_path: &'static str,
    pub query_param: &'static str,
    pub search_cards: CardRules,
    /// Search-page results must match this to count as articles.
    pub article_pattern: Option<&'static str>,
    pub section_cards: CardRules,
    /// Fewer search results than this triggers the section scan.
    pub min_results: usize,
}

#[derive(Debug, Clone)]
struct CompiledRules {
    rules: CardRules,
    link_fallback: Regex,
}

impl CompiledRules {
    fn new(rules: CardRules) -> Result<Self, CrawlError> {
        let link_fallback = compile(rules.link_fallback)?;
        Ok(Self {
            rules,
            link_fallback,
        })
    }
}

fn compile(pattern: &str) -> Result<Regex, CrawlError> {
    Regex::new(pattern).map_err(|e| CrawlError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

#[derive(Debug)]
struct Card {
    url: String,
    title: String,
    published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct SiteSearcher {
    source: String,
    base_url: Url,
    fetch: FetchClient,
    profile: SiteSearchProfile,
    search_rules: CompiledRules,
    section_rules: CompiledRules,
    article_pattern: Option<Regex>,
    sections: Vec<String>,
}

impl SiteSearcher {
    /// # Errors
    ///
    /// Returns [`CrawlError::InvalidUrl`] for a relative `base_url` and
    /// [`CrawlError::InvalidPattern`] for a bad link pattern.
    pub fn new(
        source: &str,
        base_url: &str,
        profile: SiteSearchProfile,
        fetch: FetchClient,
    ) -> Result<Self, CrawlError> {
        Ok(Self {
            source: source.to_string(),
            base_url: parse_base_url(base_url)?,
            fetch,
            search_rules: CompiledRules::new(profile.search_cards.clone())?,
            section_rules: CompiledRules::new(profile.section_cards.clone())?,
            article_pattern: profile.article_pattern.map(compile).transpose()?,
            profile,
            sections: Vec::new(),
        })
    }

    /// Section (or category) index pages scanned when search comes up short.
    #[must_use]
    pub fn with_sections(mut self, sections: Vec<String>) -> Self {
        self.sections = sections;
        self
    }

    #[must_use]
    pub fn with_min_results(mut self, min_results: usize) -> Self {
        self.profile.min_results = min_results;
        self
    }

    fn root(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    async fn search_page(&self, company: &str) -> Vec<ArticleMeta> {
        let url = format!("{}/{}", self.root(), self.profile.search_path);
        let Some(html) = self
            .fetch
            .get_with_params(&url, &[(self.profile.query_param, company)])
            .await
        else {
            tracing::warn!(source = %self.source, url, "failed to fetch search page");
            return Vec::new();
        };

        let cards = parse_cards(&html, &self.base_url, &self.search_rules);
        let results: Vec<ArticleMeta> = cards
            .into_iter()
            .filter(|card| {
                self.article_pattern
                    .as_ref()
                    .is_none_or(|pattern| pattern.is_match(&card.url))
            })
            .map(|card| self.to_meta(card))
            .collect();

        tracing::debug!(source = %self.source, company, count = results.len(), "search page parsed");
        results
    }

    async fn search_section(&self, section: &str, company: &str) -> Vec<ArticleMeta> {
        let url = format!("{}/{}/", self.root(), section.trim_matches('/'));
        let Some(html) = self.fetch.get(&url).await else {
            tracing::warn!(source = %self.source, url, "failed to fetch section");
            return Vec::new();
        };

        let company_lower = company.to_lowercase();
        let results: Vec<ArticleMeta> = parse_cards(&html, &self.base_url, &self.section_rules)
            .into_iter()
            .filter(|card| card.title.to_lowercase().contains(&company_lower))
            .map(|card| self.to_meta(card))
            .collect();

        tracing::debug!(source = %self.source, section, count = results.len(), "section scanned");
        results
    }

    fn to_meta(&self, card: Card) -> ArticleMeta {
        ArticleMeta::new(card.url, card.title, card.published_at, &self.source)
    }
}

fn selectors(css: &[&str]) -> Vec<Selector> {
    css.iter()
        .filter_map(|s| match Selector::parse(s) {
            Ok(selector) => Some(selector),
            Err(e) => {
                tracing::warn!(selector = s, error = %e, "invalid card selector skipped");
                None
            }
        })
        .collect()
}

fn text_of(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

fn parse_cards(html: &str, base: &Url, compiled: &CompiledRules) -> Vec<Card> {
    let rules = &compiled.rules;
    let (Ok(anchor_sel), Ok(time_sel)) = (Selector::parse("a[href]"), Selector::parse("time[datetime]"))
    else {
        return Vec::new();
    };
    let card_sels = selectors(&rules.cards);
    let title_sels = selectors(&rules.titles);

    let document = Html::parse_document(html);
    let mut items: Vec<ElementRef<'_>> = card_sels
        .iter()
        .flat_map(|selector| document.select(selector))
        .collect();
    if items.is_empty() {
        items = document
            .select(&anchor_sel)
            .filter(|a| {
                a.value()
                    .attr("href")
                    .is_some_and(|href| compiled.link_fallback.is_match(href))
            })
            .collect();
    }

    // Nested wrappers can match the same article more than once.
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter_map(|item| {
            let is_anchor = item.value().name() == "a";
            let link = if is_anchor {
                item
            } else {
                item.select(&anchor_sel).next()?
            };
            let url = resolve_link(base, link.value().attr("href")?)?;

            let title = if is_anchor {
                text_of(item)
            } else {
                title_sels
                    .iter()
                    .find_map(|selector| item.select(selector).next())
                    .map_or_else(|| text_of(link), text_of)
            };
            if !usable_title(&title) {
                return None;
            }

            let published_at = item
                .select(&time_sel)
                .next()
                .and_then(|t| t.value().attr("datetime"))
                .and_then(parse_any_date);

            Some(Card {
                url,
                title,
                published_at,
            })
        })
        .filter(|card| seen.insert(card.url.clone()))
        .take(rules.max_items)
        .collect()
}

#[async_trait]
impl Search for SiteSearcher {
    async fn search(
        &self,
        company: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<ArticleMeta>, CrawlError> {
        tracing::info!(source = %self.source, company, "searching site");

        let mut results = dedup_by_url(self.search_page(company).await);
        let from_search = results.len();
        if from_search < self.profile.min_results {
            tracing::debug!(
                source = %self.source,
                company,
                from_search,
                min_results = self.profile.min_results,
                "too few search results, scanning sections"
            );
            for section in &self.sections {
                results.extend(self.search_section(section, company).await);
            }
        }

        let total = results.len();
        let unique = dedup_by_url(results);
        tracing::info!(
            source = %self.source,
            company,
            total,
            unique = unique.len(),
            "site search completed"
        );
        Ok(unique)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> CompiledRules {
        CompiledRules::new(CardRules {
            cards: vec!["div.card"],
            titles: vec!["h3", "h2"],
            link_fallback: r"/20\d{2}/.*\.html",
            max_items: 2,
        })
        .unwrap()
    }

    fn base() -> Url {
        Url::parse("https://www.example.com").unwrap()
    }

    #[test]
    fn reads_cards_with_title_and_time() {
        let html = r#"
          <div class="card">
            <a href="/2024/02/01/apple-vision.html">Read</a>
            <h3>Apple Vision Pro goes on sale</h3>
            <time datetime="2024-02-01T09:00:00+00:00"></time>
          </div>
          <div class="card"><a href="mailto:x@example.com">Mail the newsroom today</a></div>
          <div class="card"><a href="/2024/02/02/x.html">Link text is the title</a></div>"#;

        let cards = parse_cards(html, &base(), &rules());
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].url, "https://www.example.com/2024/02/01/apple-vision.html");
        assert_eq!(cards[0].title, "Apple Vision Pro goes on sale");
        assert!(cards[0].published_at.is_some());
        assert!(cards[1].url.ends_with("/2024/02/02/x.html"));
    }

    #[test]
    fn cap_counts_distinct_usable_cards_only() {
        let html = r#"
          <div class="card"><div class="card"><div class="card">
            <a href="/2024/04/01/first.html">First story headline here</a>
          </div></div></div>
          <div class="card"><a href="/nav">Menu</a></div>
          <div class="card"><a href="/2024/04/02/second.html">Second story headline here</a></div>
          <div class="card"><a href="/2024/04/03/third.html">Third story headline here</a></div>"#;

        let cards = parse_cards(html, &base(), &rules());
        let urls: Vec<_> = cards.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.example.com/2024/04/01/first.html",
                "https://www.example.com/2024/04/02/second.html",
            ]
        );
    }

    #[test]
    fn title_falls_back_to_link_text() {
        let html = r#"<div class="card"><a href="/2024/02/02/x.html">Link text is the title</a></div>"#;
        let cards = parse_cards(html, &base(), &rules());
        assert_eq!(cards[0].title, "Link text is the title");
        assert_eq!(cards[0].published_at, None);
    }

    #[test]
    fn bare_links_used_when_no_card_matches() {
        let html = r#"
          <a href="/about">About this website and team</a>
          <a href="/2024/03/01/tesla-deliveries.html">Tesla deliveries rise sharply</a>
          <a href="/2024/03/02/tesla-factory.html">Tesla opens another factory</a>
          <a href="/2024/03/03/tesla-recall.html">Tesla announces a recall</a>"#;
        let cards = parse_cards(html, &base(), &rules());
        assert_eq!(cards.len(), 2);
        assert!(cards[0].url.ends_with("tesla-deliveries.html"));
    }
}
