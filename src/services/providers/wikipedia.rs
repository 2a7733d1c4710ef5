/// Wikipedia page summaries via the REST API
///
/// API Flow:
/// 1. `GET {base}/api/rest_v1/page/summary/{title}` → lead extract + canonical page URL
///
/// The base URL carries a `{lang}` placeholder so the language edition is
/// picked per request (e.g. `https://{lang}.wikipedia.org`).
use reqwest::{Client as HttpClient, StatusCode, Url};
use serde::Deserialize;

use crate::{
    models::PageSummary,
    services::providers::{ensure_success, Encyclopedia, SourceError, SourceResult},
};

const LANG_PLACEHOLDER: &str = "{lang}";

#[derive(Debug, Deserialize)]
struct ApiPageSummary {
    #[serde(default)]
    extract: String,
    content_urls: ApiContentUrls,
}

#[derive(Debug, Deserialize)]
struct ApiContentUrls {
    desktop: ApiPageUrls,
}

#[derive(Debug, Deserialize)]
struct ApiPageUrls {
    page: String,
}

impl From<ApiPageSummary> for PageSummary {
    fn from(page: ApiPageSummary) -> Self {
        PageSummary {
            summary: page.extract,
            canonical_url: page.content_urls.desktop.page,
        }
    }
}

#[derive(Clone)]
pub struct WikipediaClient {
    http_client: HttpClient,
    base_url: String,
}

impl WikipediaClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url,
        }
    }

    /// Builds the summary URL, percent-encoding the page title
    fn summary_url(&self, city: &str, language: &str) -> SourceResult<Url> {
        let base = self.base_url.replace(LANG_PLACEHOLDER, language);
        let mut url = Url::parse(&base)
            .map_err(|e| SourceError::Unavailable(format!("Invalid Wikipedia URL {}: {}", base, e)))?;

        let title = city.replace(' ', "_");
        url.path_segments_mut()
            .map_err(|_| SourceError::Unavailable(format!("Wikipedia URL cannot be a base: {}", base)))?
            .pop_if_empty()
            .extend(["api", "rest_v1", "page", "summary", title.as_str()]);

        Ok(url)
    }
}

#[async_trait::async_trait]
impl Encyclopedia for WikipediaClient {
    async fn lookup(&self, city: &str, language: &str) -> SourceResult<PageSummary> {
        let url = self.summary_url(city, language)?;
        let response = self.http_client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SourceError::PageNotFound(format!(
                "Wikipedia ({}) has no page for {}",
                language, city
            )));
        }

        let response = ensure_success(response, self.name()).await?;
        let page: ApiPageSummary = response.json().await?;

        tracing::info!(
            city = %city,
            language = %language,
            provider = "wikipedia",
            "Wikipedia summary fetched"
        );

        Ok(page.into())
    }

    fn name(&self) -> &'static str {
        "wikipedia"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_url_uses_language_and_encodes_title() {
        let client = WikipediaClient::new("https://{lang}.wikipedia.org".to_string());

        let url = client.summary_url("New York", "de").unwrap();
        assert_eq!(
            url.as_str(),
            "https://de.wikipedia.org/api/rest_v1/page/summary/New_York"
        );

        let url = client.summary_url("Zürich", "en").unwrap();
        assert_eq!(
            url.as_str(),
            "https://en.wikipedia.org/api/rest_v1/page/summary/Z%C3%BCrich"
        );
    }

    #[test]
    fn test_summary_url_without_placeholder() {
        let client = WikipediaClient::new("http://127.0.0.1:8080/wiki/".to_string());
        let url = client.summary_url("Lisbon", "en").unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/wiki/api/rest_v1/page/summary/Lisbon"
        );
    }

    #[test]
    fn test_page_summary_deserialization() {
        let json = r#"{
            "type": "standard",
            "title": "Lisbon",
            "extract": "Lisbon is the capital and largest city of Portugal.",
            "content_urls": {
                "desktop": {
                    "page": "https://en.wikipedia.org/wiki/Lisbon",
                    "revisions": "https://en.wikipedia.org/wiki/Lisbon?action=history"
                },
                "mobile": {
                    "page": "https://en.m.wikipedia.org/wiki/Lisbon"
                }
            }
        }"#;

        let page: ApiPageSummary = serde_json::from_str(json).unwrap();
        let summary = PageSummary::from(page);

        assert_eq!(
            summary.summary,
            "Lisbon is the capital and largest city of Portugal."
        );
        assert_eq!(summary.canonical_url, "https://en.wikipedia.org/wiki/Lisbon");
    }
}
