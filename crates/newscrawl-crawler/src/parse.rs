//! Article-page parsing: the [`Parse`] capability and its profile-driven
//! implementation.

use async_trait::async_trait;

use crate::extract::ExtractionProfile;
use crate::fetch::FetchClient;
use crate::types::ArticleContent;

/// Turns one article URL into its content, or `None` when the page could not
/// be fetched or held no article text.
#[async_trait]
pub trait Parse: Send + Sync {
    async fn parse(&self, url: &str) -> Option<ArticleContent>;
}

/// A [`Parse`] implementation that fetches the page and applies an
/// [`ExtractionProfile`].
#[derive(Debug, Clone)]
pub struct ProfileParser {
    source: String,
    fetch: FetchClient,
    profile: ExtractionProfile,
    keep_raw_html: bool,
}

impl ProfileParser {
    #[must_use]
    pub fn new(source: &str, fetch: FetchClient, profile: ExtractionProfile) -> Self {
        Self {
            source: source.to_string(),
            fetch,
            profile,
            keep_raw_html: false,
        }
    }

    /// Keep the fetched page on [`ArticleContent::raw_html`].
    #[must_use]
    pub fn keep_raw_html(mut self, keep: bool) -> Self {
        self.keep_raw_html = keep;
        self
    }
}

#[async_trait]
impl Parse for ProfileParser {
    async fn parse(&self, url: &str) -> Option<ArticleContent> {
        let Some(html) = self.fetch.get(url).await else {
            tracing::warn!(source = %self.source, url, "article fetch failed");
            return None;
        };

        let Some(extracted) = self.profile.extract(&html) else {
            tracing::warn!(source = %self.source, url, "no article body found");
            return None;
        };

        let mut content = ArticleContent::new(url, extracted.body_text);
        content.author = extracted.author;
        content.section = extracted.section;
        if self.keep_raw_html {
            content.raw_html = Some(html);
        }
        tracing::debug!(
            source = %self.source,
            url,
            chars = content.body_text.len(),
            "article parsed"
        );
        Some(content)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::fetch::FetchConfig;

    fn parser(keep_raw: bool) -> ProfileParser {
        let fetch = FetchClient::new(FetchConfig {
            max_attempts: 1,
            delay: Duration::ZERO,
            ..FetchConfig::default()
        })
        .unwrap();
        ProfileParser::new("test", fetch, ExtractionProfile::new(&["article"])).keep_raw_html(keep_raw)
    }

    async fn serve(server: &MockServer, route: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn parses_body_and_keeps_raw_html_on_request() {
        let server = MockServer::start().await;
        let page = "<html><body><article><p>Revenue rose.</p></article></body></html>";
        serve(&server, "/story", 200, page).await;
        let url = format!("{}/story", server.uri());

        let plain = parser(false).parse(&url).await.unwrap();
        assert_eq!(plain.body_text, "Revenue rose.");
        assert_eq!(plain.url, url);
        assert!(plain.raw_html.is_none());

        let kept = parser(true).parse(&url).await.unwrap();
        assert_eq!(kept.raw_html.as_deref(), Some(page));
    }

    #[tokio::test]
    async fn empty_container_and_failed_fetch_are_none() {
        let server = MockServer::start().await;
        serve(&server, "/empty", 200, "<html><body><article></article></body></html>").await;
        serve(&server, "/gone", 404, "").await;

        let parser = parser(false);
        assert!(parser.parse(&format!("{}/empty", server.uri())).await.is_none());
        assert!(parser.parse(&format!("{}/gone", server.uri())).await.is_none());
    }
}
