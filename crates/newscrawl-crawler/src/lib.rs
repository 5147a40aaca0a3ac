//! Multi-source news crawl engine.
//!
//! Each source pairs a [`Search`] strategy (feed filtering, date-windowed site
//! search, or site search with section fallback) with a [`Parse`]
//! implementation driven by a declarative [`ExtractionProfile`]. A
//! [`SourceScraper`] joins the two, and the [`Pipeline`] fans a ticker list
//! out across every enabled source while isolating per-source failures.
//!
//! All HTTP goes through [`FetchClient`], which retries with a fixed delay
//! and never surfaces transport errors: a missing document is a normal
//! outcome at every layer above it.

pub mod crawl;
pub mod dates;
pub mod error;
pub mod extract;
pub mod feed;
pub mod fetch;
pub mod parse;
pub mod pipeline;
pub mod search;
pub mod sources;
pub mod types;
pub mod windows;

pub use crawl::SourceScraper;
pub use error::CrawlError;
pub use extract::{Boilerplate, ExtractionProfile, FieldRule};
pub use feed::{parse_feed_document, FeedParser};
pub use fetch::{FetchClient, FetchConfig};
pub use parse::{Parse, ProfileParser};
pub use pipeline::{Pipeline, PipelineOutcome, SourceFailure};
pub use search::Search;
pub use sources::build_scrapers;
pub use types::{Article, ArticleContent, ArticleMeta, DateWindow, FeedItem};
pub use windows::split_date_range;
