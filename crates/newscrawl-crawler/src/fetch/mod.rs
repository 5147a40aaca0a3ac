//! HTTP GET with bounded retries, a fixed inter-request delay, and a stable
//! browser identity.

mod pacing;
mod retry;

use std::sync::Arc;
use std::time::Duration;

use newscrawl_core::HttpSettings;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::error::CrawlError;
use pacing::HostPacer;
use retry::retry_with_fixed_delay;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Immutable fetch policy, fixed when the client is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub max_attempts: u32,
    /// Pause after every attempt, successful or not.
    pub delay: Duration,
    pub user_agent: String,
    /// Minimum spacing between requests to one host across all clones.
    pub per_host_interval: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_attempts: 3,
            delay: Duration::from_millis(1_000),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            per_host_interval: Duration::ZERO,
        }
    }
}

impl FetchConfig {
    /// Build a policy from the crawler document's `http` block.
    #[must_use]
    pub fn from_settings(settings: &HttpSettings) -> Self {
        Self {
            timeout: Duration::from_secs(settings.timeout_secs),
            max_attempts: settings.max_attempts,
            delay: Duration::from_millis(settings.delay_ms),
            user_agent: settings
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            per_host_interval: Duration::from_millis(settings.per_host_interval_ms),
        }
    }
}

#[derive(Debug, Error)]
enum AttemptFailure {
    #[error("HTTP {0}")]
    Status(u16),
    #[error("request error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Page fetcher used by every searcher and parser.
///
/// Clones share the connection pool and the per-host pacer.
/// [`FetchClient::with_delay`] derives a client with a different per-attempt
/// delay that still shares both.
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
    config: Arc<FetchConfig>,
    pacer: Arc<HostPacer>,
}

impl FetchClient {
    /// Creates a client with the configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: FetchConfig) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout.min(Duration::from_secs(10)))
            .user_agent(config.user_agent.as_str())
            .build()?;
        let pacer = Arc::new(HostPacer::new(config.per_host_interval));
        Ok(Self {
            client,
            config: Arc::new(config),
            pacer,
        })
    }

    /// A client identical to this one except for the per-attempt delay.
    #[must_use]
    pub fn with_delay(&self, delay: Duration) -> Self {
        let config = FetchConfig {
            delay,
            ..(*self.config).clone()
        };
        Self {
            client: self.client.clone(),
            config: Arc::new(config),
            pacer: Arc::clone(&self.pacer),
        }
    }

    #[must_use]
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// GET `url` and return the body of the first 200 response.
    ///
    /// Returns `None` once every attempt has failed; failures are logged.
    pub async fn get(&self, url: &str) -> Option<String> {
        self.get_with_params(url, &[]).await
    }

    /// Like [`FetchClient::get`], appending `params` as URL-encoded query pairs.
    pub async fn get_with_params(&self, url: &str, params: &[(&str, &str)]) -> Option<String> {
        let host = reqwest::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_owned))
            .unwrap_or_default();

        retry_with_fixed_delay(url, self.config.max_attempts, self.config.delay, |_| {
            let host = host.as_str();
            async move {
                self.pacer.wait(host).await;

                let mut request = self
                    .client
                    .get(url)
                    .header(
                        reqwest::header::ACCEPT,
                        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                    )
                    .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9");
                if !params.is_empty() {
                    request = request.query(params);
                }

                let response = request.send().await?;
                let status = response.status();
                if status != StatusCode::OK {
                    return Err(AttemptFailure::Status(status.as_u16()));
                }

                Ok(response.text().await?)
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_policy() {
        let config = FetchConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.delay, Duration::from_secs(1));
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert!(config.per_host_interval.is_zero());
    }

    #[test]
    fn from_settings_falls_back_to_browser_identity() {
        let settings = HttpSettings {
            timeout_secs: 20,
            max_attempts: 5,
            delay_ms: 1_500,
            user_agent: None,
            per_host_interval_ms: 250,
        };
        let config = FetchConfig::from_settings(&settings);
        assert_eq!(config.timeout, Duration::from_secs(20));
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.delay, Duration::from_millis(1_500));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.per_host_interval, Duration::from_millis(250));
    }

    #[test]
    fn with_delay_keeps_everything_else() {
        let client = FetchClient::new(FetchConfig::default()).unwrap();
        let slower = client.with_delay(Duration::from_millis(2_000));
        assert_eq!(slower.config().delay, Duration::from_millis(2_000));
        assert_eq!(slower.config().max_attempts, client.config().max_attempts);
        assert_eq!(client.config().delay, Duration::from_secs(1));
        assert!(Arc::ptr_eq(&client.pacer, &slower.pacer));
    }
}
