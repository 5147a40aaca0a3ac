//! Fan a ticker list out over every enabled source.
//!
//! Each (company, source) crawl is guarded on its own: an error or a panic is
//! recorded as a [`SourceFailure`] and the run moves on. Companies may be
//! processed concurrently, but results are merged in ticker-list order and,
//! within a company, in source-name order.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;

use chrono::NaiveDate;
use futures::{stream, FutureExt, StreamExt};
use newscrawl_core::{Company, SourcesConfig};

use crate::crawl::SourceScraper;
use crate::error::CrawlError;
use crate::fetch::FetchClient;
use crate::sources::build_scrapers;
use crate::types::Article;

/// A (company, source) crawl that produced no articles because it failed.
#[derive(Debug)]
pub struct SourceFailure {
    pub company: String,
    pub ticker: String,
    pub source_name: String,
    pub error: CrawlError,
}

#[derive(Debug, Default)]
pub struct PipelineOutcome {
    pub articles: Vec<Article>,
    /// Article counts by source name; every registered source has an entry.
    pub per_source: BTreeMap<String, usize>,
    pub failures: Vec<SourceFailure>,
}

impl PipelineOutcome {
    #[must_use]
    pub fn total(&self) -> usize {
        self.articles.len()
    }
}

#[derive(Debug)]
pub struct Pipeline {
    scrapers: BTreeMap<String, SourceScraper>,
    max_concurrent_companies: usize,
}

struct CompanyRun {
    results: Vec<(String, Vec<Article>)>,
    failures: Vec<SourceFailure>,
}

impl Pipeline {
    #[must_use]
    pub fn new(scrapers: BTreeMap<String, SourceScraper>) -> Self {
        Self {
            scrapers,
            max_concurrent_companies: 1,
        }
    }

    /// A pipeline over exactly one source.
    #[must_use]
    pub fn single(scraper: SourceScraper) -> Self {
        let mut scrapers = BTreeMap::new();
        scrapers.insert(scraper.source().to_string(), scraper);
        Self::new(scrapers)
    }

    /// Build every enabled source from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError`] if a source cannot be constructed.
    pub fn from_config(config: &SourcesConfig, fetch: &FetchClient) -> Result<Self, CrawlError> {
        Ok(Self::new(build_scrapers(config, fetch)?))
    }

    /// Allow up to `n` companies in flight at once. `0` is treated as `1`.
    #[must_use]
    pub fn with_max_concurrent_companies(mut self, n: usize) -> Self {
        self.max_concurrent_companies = n.max(1);
        self
    }

    #[must_use]
    pub fn source_names(&self) -> Vec<&str> {
        self.scrapers.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn scraper(&self, source: &str) -> Option<&SourceScraper> {
        self.scrapers.get(source)
    }

    /// Crawl every company against every registered source.
    pub async fn run(
        &self,
        companies: &[Company],
        start: NaiveDate,
        end: NaiveDate,
    ) -> PipelineOutcome {
        let mut outcome = PipelineOutcome::default();
        if self.scrapers.is_empty() {
            tracing::warn!("no sources enabled, nothing to crawl");
            return outcome;
        }
        outcome.per_source = self.scrapers.keys().map(|name| (name.clone(), 0)).collect();

        tracing::info!(
            companies = companies.len(),
            sources = ?self.source_names(),
            %start,
            %end,
            concurrency = self.max_concurrent_companies,
            "pipeline started"
        );

        let runs: Vec<CompanyRun> = stream::iter(
            companies
                .iter()
                .map(|company| self.crawl_company(company, start, end)),
        )
        .buffered(self.max_concurrent_companies)
        .collect()
        .await;

        for run in runs {
            for (source, articles) in run.results {
                *outcome.per_source.entry(source).or_default() += articles.len();
                outcome.articles.extend(articles);
            }
            outcome.failures.extend(run.failures);
        }

        for (source, count) in &outcome.per_source {
            tracing::info!(source = %source, count, "source total");
        }
        tracing::info!(
            total = outcome.total(),
            failures = outcome.failures.len(),
            "pipeline finished"
        );
        outcome
    }

    async fn crawl_company(&self, company: &Company, start: NaiveDate, end: NaiveDate) -> CompanyRun {
        let mut run = CompanyRun {
            results: Vec::new(),
            failures: Vec::new(),
        };

        for (name, scraper) in &self.scrapers {
            let guarded = AssertUnwindSafe(scraper.crawl(company, start, end))
                .catch_unwind()
                .await;

            let error = match guarded {
                Ok(Ok(articles)) => {
                    tracing::info!(
                        company = %company.company,
                        source = %name,
                        count = articles.len(),
                        "source crawl completed"
                    );
                    run.results.push((name.clone(), articles));
                    continue;
                }
                Ok(Err(e)) => e,
                Err(payload) => CrawlError::Panicked {
                    source_name: name.clone(),
                    company: company.company.clone(),
                    message: panic_message(payload.as_ref()),
                },
            };

            tracing::error!(
                company = %company.company,
                ticker = %company.ticker,
                source = %name,
                error = %error,
                "source crawl failed"
            );
            run.failures.push(SourceFailure {
                company: company.company.clone(),
                ticker: company.ticker.clone(),
                source_name: name.clone(),
                error,
            });
        }

        run
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::crawl::test_support::{FixedSearch, MapParse};
    use crate::search::Search;
    use crate::types::ArticleMeta;

    /// Fails for one company, panics for another, finds one URL otherwise.
    struct Temperamental;

    #[async_trait]
    impl Search for Temperamental {
        async fn search(
            &self,
            company: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<ArticleMeta>, CrawlError> {
            match company {
                "Broken" => Err(CrawlError::Source {
                    source_name: "flaky".to_string(),
                    reason: "search page changed".to_string(),
                }),
                "Panicky" => panic!("selector table corrupted"),
                _ => Ok(vec![ArticleMeta::new(
                    format!("https://flaky/{company}"),
                    format!("{company} headline text"),
                    None,
                    "flaky",
                )]),
            }
        }
    }

    fn parser_for(urls: &[&'static str]) -> MapParse {
        MapParse {
            bodies: urls.iter().map(|u| (*u, "body")).collect(),
            ..MapParse::default()
        }
    }

    fn pipeline() -> Pipeline {
        let mut scrapers = BTreeMap::new();
        scrapers.insert(
            "flaky".to_string(),
            SourceScraper::new(
                "flaky",
                Box::new(Temperamental),
                Box::new(parser_for(&[
                    "https://flaky/Apple",
                    "https://flaky/Broken",
                    "https://flaky/Panicky",
                    "https://flaky/Tesla",
                ])),
            ),
        );
        scrapers.insert(
            "steady".to_string(),
            SourceScraper::new(
                "steady",
                Box::new(FixedSearch(vec!["https://steady/1", "https://steady/2"])),
                Box::new(parser_for(&["https://steady/1", "https://steady/2"])),
            ),
        );
        Pipeline::new(scrapers)
    }

    fn companies() -> Vec<Company> {
        vec![
            Company::new("Apple", "AAPL", "Technology"),
            Company::new("Broken", "BRKN", "Industrials"),
            Company::new("Panicky", "PANC", "Energy"),
            Company::new("Tesla", "TSLA", "Automotive"),
        ]
    }

    fn range() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    #[tokio::test]
    async fn failures_are_isolated_per_company_and_source() {
        let (start, end) = range();
        let outcome = pipeline().run(&companies(), start, end).await;

        assert_eq!(outcome.per_source["flaky"], 2);
        assert_eq!(outcome.per_source["steady"], 8);
        assert_eq!(outcome.total(), 10);
        assert_eq!(outcome.failures.len(), 2);

        assert_eq!(outcome.failures[0].ticker, "BRKN");
        assert!(matches!(outcome.failures[0].error, CrawlError::Source { .. }));
        assert_eq!(outcome.failures[1].ticker, "PANC");
        match &outcome.failures[1].error {
            CrawlError::Panicked { message, .. } => {
                assert_eq!(message, "selector table corrupted");
            }
            other => panic!("expected panic failure, got {other}"),
        }
    }

    #[tokio::test]
    async fn concurrent_run_keeps_ticker_order() {
        let (start, end) = range();
        let outcome = pipeline()
            .with_max_concurrent_companies(4)
            .run(&companies(), start, end)
            .await;

        let tickers: Vec<_> = outcome.articles.iter().map(|a| a.ticker.as_str()).collect();
        assert_eq!(
            tickers,
            vec!["AAPL", "AAPL", "AAPL", "BRKN", "BRKN", "PANC", "PANC", "TSLA", "TSLA", "TSLA"]
        );
        assert_eq!(outcome.failures.len(), 2);
    }

    #[tokio::test]
    async fn no_sources_is_an_empty_outcome() {
        let (start, end) = range();
        let outcome = Pipeline::new(BTreeMap::new())
            .run(&companies(), start, end)
            .await;
        assert_eq!(outcome.total(), 0);
        assert!(outcome.per_source.is_empty());
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn single_registers_under_the_scraper_source() {
        let pipeline = Pipeline::single(SourceScraper::new(
            "reuters",
            Box::new(FixedSearch(Vec::new())),
            Box::new(MapParse::default()),
        ));
        assert_eq!(pipeline.source_names(), vec!["reuters"]);

        let (start, end) = range();
        let outcome = pipeline.run(&companies()[..1], start, end).await;
        assert_eq!(outcome.per_source["reuters"], 0);
        assert!(outcome.articles.is_empty());
    }
}
