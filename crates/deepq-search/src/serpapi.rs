use async_trait::async_trait;
use serde::Deserialize;

use crate::{SearchHit, SearchProvider};
use deepq_types::{DeepqError, Result};

// ---------------------------------------------------------------------------
// SerpApiClient
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct SerpApiClient {
    api_key: Option<String>,
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<SearchHit>,
}

impl SerpApiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key: Some(api_key),
            client: reqwest::Client::new(),
            base_url: "https://serpapi.com".to_string(),
        }
    }

    /// Build a client from `SERPAPI_API_KEY`. An absent key still yields a
    /// usable client whose searches return empty result lists.
    pub fn from_env() -> Self {
        let api_key = std::env::var("SERPAPI_API_KEY").ok();
        if api_key.is_none() {
            tracing::warn!("SERPAPI_API_KEY not set; searches will return no results");
        }
        Self {
            api_key,
            client: reqwest::Client::new(),
            base_url: "https://serpapi.com".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }
}

#[async_trait]
impl SearchProvider for SerpApiClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let Some(ref key) = self.api_key else {
            return Ok(Vec::new());
        };

        let response = self
            .client
            .get(format!("{}/search.json", self.base_url))
            .query(&[("engine", "google"), ("q", query), ("api_key", key)])
            .send()
            .await
            .map_err(|e| DeepqError::Provider {
                provider: "serpapi".into(),
                status: 0,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DeepqError::Provider {
                provider: "serpapi".into(),
                status: status.as_u16(),
                message,
            });
        }

        let payload: SerpApiResponse =
            response.json().await.map_err(|e| DeepqError::Provider {
                provider: "serpapi".into(),
                status: status.as_u16(),
                message: e.to_string(),
            })?;

        tracing::debug!(query = %query, hits = payload.organic_results.len(), "Search completed");
        Ok(payload.organic_results)
    }

    fn name(&self) -> &str {
        "serpapi"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn uncredentialed_client_returns_empty_not_error() {
        let client = SerpApiClient {
            api_key: None,
            client: reqwest::Client::new(),
            base_url: "https://serpapi.com".into(),
        };
        let hits = client.search("anything").await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn unreachable_server_maps_to_provider_error() {
        let client =
            SerpApiClient::new("key".into()).with_base_url("http://127.0.0.1:9".into());
        let err = client.search("anything").await.unwrap_err();
        match err {
            DeepqError::Provider { provider, .. } => assert_eq!(provider, "serpapi"),
            other => panic!("Expected Provider error, got: {other:?}"),
        }
    }

    #[test]
    fn response_parses_organic_results() {
        let json = r#"{
            "organic_results": [
                {"title": "A", "link": "https://a.example", "snippet": "sa"},
                {"title": "B", "link": "https://b.example"}
            ],
            "search_metadata": {"id": "ignored"}
        }"#;
        let parsed: SerpApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.organic_results.len(), 2);
        assert_eq!(parsed.organic_results[1].snippet, "");
    }

    #[test]
    fn response_tolerates_missing_organic_results() {
        let parsed: SerpApiResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.organic_results.is_empty());
    }
}
