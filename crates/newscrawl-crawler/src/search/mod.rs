//! Candidate discovery: the [`Search`] capability and its three strategies.

mod feed_filter;
mod site;
mod windowed;

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Url;

use crate::error::CrawlError;
use crate::types::ArticleMeta;

pub use feed_filter::{curated_synonyms, FeedFilterSearcher};
pub use site::{CardRules, SiteSearchProfile, SiteSearcher};
pub use windowed::WindowedSearcher;

/// Titles shorter than this (in characters) are navigation noise.
pub const MIN_TITLE_LEN: usize = 10;

/// Finds candidate articles about one company in a date range.
///
/// Fetch failures are absorbed into an empty or partial result; an `Err`
/// means something unexpected and is isolated by the pipeline.
#[async_trait]
pub trait Search: Send + Sync {
    async fn search(
        &self,
        company: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ArticleMeta>, CrawlError>;
}

/// Resolve `href` against `base`, keeping only absolute http(s) links.
pub(crate) fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url.into())
}

pub(crate) fn usable_title(title: &str) -> bool {
    title.chars().count() >= MIN_TITLE_LEN
}

/// Drop repeated URLs, keeping the first occurrence and the original order.
pub(crate) fn dedup_by_url(candidates: Vec<ArticleMeta>) -> Vec<ArticleMeta> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|meta| seen.insert(meta.url.clone()))
        .collect()
}

pub(crate) fn parse_base_url(raw: &str) -> Result<Url, CrawlError> {
    Url::parse(raw).map_err(|e| CrawlError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.example.com/markets/").unwrap()
    }

    #[test]
    fn resolves_relative_and_root_relative_links() {
        assert_eq!(
            resolve_link(&base(), "/2024/01/02/story.html").as_deref(),
            Some("https://www.example.com/2024/01/02/story.html")
        );
        assert_eq!(
            resolve_link(&base(), "story").as_deref(),
            Some("https://www.example.com/markets/story")
        );
        assert_eq!(
            resolve_link(&base(), "https://other.example.org/x#comments").as_deref(),
            Some("https://other.example.org/x")
        );
    }

    #[test]
    fn rejects_unusable_links() {
        for href in ["", "#top", "mailto:desk@example.com", "javascript:void(0)", "ftp://x/y"] {
            assert_eq!(resolve_link(&base(), href), None, "{href}");
        }
    }

    #[test]
    fn title_length_counts_characters() {
        assert!(!usable_title("Too short"));
        assert!(usable_title("Long enough"));
        assert!(usable_title("éééééééééé"));
    }

    #[test]
    fn dedup_keeps_first_seen() {
        let make = |url: &str, title: &str| {
            ArticleMeta::new(url.to_string(), title.to_string(), None, "test")
        };
        let out = dedup_by_url(vec![
            make("https://a", "first A title"),
            make("https://b", "only B title"),
            make("https://a", "second A title"),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].title, "first A title");
        assert_eq!(out[1].url, "https://b");
    }
}
