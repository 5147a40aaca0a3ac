use std::collections::HashSet;

use chrono::NaiveDate;
use newscrawl_core::Company;

use crate::error::CrawlError;
use crate::parse::Parse;
use crate::search::Search;
use crate::types::Article;

/// One source's searcher and parser joined under a fixed source tag.
pub struct SourceScraper {
    source: String,
    searcher: Box<dyn Search>,
    parser: Box<dyn Parse>,
}

impl std::fmt::Debug for SourceScraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceScraper")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl SourceScraper {
    #[must_use]
    pub fn new(source: &str, searcher: Box<dyn Search>, parser: Box<dyn Parse>) -> Self {
        Self {
            source: source.to_string(),
            searcher,
            parser,
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn searcher(&self) -> &dyn Search {
        self.searcher.as_ref()
    }

    #[must_use]
    pub fn parser(&self) -> &dyn Parse {
        self.parser.as_ref()
    }

    /// Search once, then parse each distinct candidate in discovery order.
    ///
    /// Candidates whose page fails to parse are dropped and counted; they are
    /// not retried here.
    ///
    /// # Errors
    ///
    /// Only a searcher error escapes; parse failures never do.
    pub async fn crawl(
        &self,
        company: &Company,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Article>, CrawlError> {
        tracing::info!(
            source = %self.source,
            company = %company.company,
            ticker = %company.ticker,
            %start,
            %end,
            "crawl started"
        );

        let candidates = self.searcher.search(&company.company, start, end).await?;
        let found = candidates.len();

        let mut seen = HashSet::new();
        let mut articles = Vec::new();
        let mut failed = 0_usize;

        for meta in candidates {
            if !seen.insert(meta.url.clone()) {
                continue;
            }
            match self.parser.parse(&meta.url).await {
                Some(content) => {
                    articles.push(Article::assemble(meta, content, company, &self.source));
                }
                None => {
                    failed += 1;
                    tracing::debug!(source = %self.source, url = %meta.url, "candidate dropped");
                }
            }
        }

        tracing::info!(
            source = %self.source,
            company = %company.company,
            found,
            parsed = articles.len(),
            failed,
            "crawl finished"
        );
        Ok(articles)
    }
}
