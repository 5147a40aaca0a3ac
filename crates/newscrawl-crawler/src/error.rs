use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid pattern \"{pattern}\": {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("source {source_name} failed: {reason}")]
    Source { source_name: String, reason: String },

    #[error("source {source_name} panicked while crawling {company}: {message}")]
    Panicked {
        source_name: String,
        company: String,
        message: String,
    },
}
