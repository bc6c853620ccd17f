// src/verify/serper.rs
// =============================================================================
// Asks the Serper search API whether Google has indexed a URL.
//
// The query is "site:<url>". If Serper returns any organic results the page
// is indexed, otherwise it is not.
//
// `check` never fails: HTTP errors, timeouts and unreadable bodies all come
// back as an Error outcome carrying a short detail string.
// =============================================================================

use crate::config::{Settings, DEFAULT_SERPER_URL};
use crate::error::{Error, Result};
use crate::verify::VerificationOutcome;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
}

// We only look at `organic`; it may be missing or null when there are no hits
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic: Option<Vec<serde_json::Value>>,
}

/// Client for the Serper search endpoint.
#[derive(Debug, Clone)]
pub struct SerperClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl SerperClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: DEFAULT_SERPER_URL.to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = Self::new(settings.require_serper_key()?, settings.serper_timeout)?;
        Ok(client.with_endpoint(settings.serper_url.clone()))
    }

    /// Points the client at another search endpoint (a proxy, or a test server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Checks one URL. Always returns an outcome for it.
    pub async fn check(&self, url: &str) -> VerificationOutcome {
        match self.query(url).await {
            Ok(true) => VerificationOutcome::indexed(url),
            Ok(false) => VerificationOutcome::not_indexed(url),
            Err(e) => {
                let detail = describe_failure(&e);
                tracing::warn!(url, detail = %detail, "Index check failed");
                VerificationOutcome::error(url, detail)
            }
        }
    }

    // Ok(true) when the site: query has organic results
    async fn query(&self, url: &str) -> Result<bool> {
        let query = format!("site:{}", url);

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&SearchRequest { q: &query })
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.organic.map(|hits| !hits.is_empty()).unwrap_or(false))
    }
}

// Short, user-facing reason for an Error outcome
fn describe_failure(error: &Error) -> String {
    match error {
        Error::Api { status, .. } => format!("HTTP {}", status),
        e if e.is_timeout() => "Timeout".to_string(),
        e => e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::IndexState;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> SerperClient {
        SerperClient::new("test-key", Duration::from_secs(5))
            .unwrap()
            .with_endpoint(format!("{}/search", server.uri()))
    }

    #[tokio::test]
    async fn test_organic_results_mean_indexed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("X-API-KEY", "test-key"))
            .and(body_json(json!({ "q": "site:https://ex.com/page" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organic": [{ "link": "https://ex.com/page" }]
            })))
            .mount(&server)
            .await;

        let outcome = client_for(&server).await.check("https://ex.com/page").await;
        assert_eq!(outcome.state, IndexState::Indexed);
        assert_eq!(outcome.detail, None);
    }

    #[tokio::test]
    async fn test_empty_or_missing_organic_means_not_indexed() {
        for body in [json!({ "organic": [] }), json!({ "searchParameters": {} }), json!({ "organic": null })] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .mount(&server)
                .await;

            let outcome = client_for(&server).await.check("https://ex.com/new").await;
            assert_eq!(outcome.state, IndexState::NotIndexed);
        }
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let outcome = client_for(&server).await.check("https://ex.com/page").await;
        assert_eq!(outcome.state, IndexState::Error);
        assert_eq!(outcome.detail.as_deref(), Some("HTTP 429"));
    }

    #[tokio::test]
    async fn test_only_200_counts_as_an_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let outcome = client_for(&server).await.check("https://ex.com/page").await;
        assert_eq!(outcome.state, IndexState::Error);
        assert_eq!(outcome.detail.as_deref(), Some("HTTP 204"));
    }

    #[tokio::test]
    async fn test_timeout_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "organic": [] }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = SerperClient::new("test-key", Duration::from_millis(200))
            .unwrap()
            .with_endpoint(format!("{}/search", server.uri()));

        let outcome = client.check("https://ex.com/slow").await;
        assert_eq!(outcome.state, IndexState::Error);
        assert_eq!(outcome.detail.as_deref(), Some("Timeout"));
    }

    #[tokio::test]
    async fn test_garbage_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let outcome = client_for(&server).await.check("https://ex.com/page").await;
        assert_eq!(outcome.state, IndexState::Error);
        assert!(outcome.detail.is_some());
    }
}
