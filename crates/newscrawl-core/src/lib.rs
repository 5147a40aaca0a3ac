//! Configuration documents and shared records for the news crawl workspace.
//!
//! Three YAML documents are read once at startup: the crawler settings
//! (date range, output path, HTTP policy), the ticker list, and the
//! per-source discovery parameters. Environment variables only choose where
//! those documents live and tweak a few runtime knobs.

pub mod app_config;
pub mod config;
pub mod crawler;
pub mod error;
pub mod sources;
pub mod tickers;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use crawler::{load_crawler_config, CrawlerConfig, CrawlerSettings, HttpSettings};
pub use error::ConfigError;
pub use sources::{
    load_sources_config, FeedSourceConfig, SiteSearchSourceConfig, SourcesConfig,
    WindowedSourceConfig,
};
pub use tickers::{load_tickers, Company, TickersFile};
