//! Tavily search backend implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use mnema_core::{defaults, Error, ProviderConfig, Result, SearchAnswer, SearchBackend};

/// Tavily web-search backend.
///
/// Only the synthesized answer is consumed; raw results are requested
/// shallow (basic depth, 3 results) and discarded.
pub struct TavilyBackend {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl TavilyBackend {
    /// Create a backend from provider configuration. Returns `None` when
    /// no search key is configured (enrichment disabled).
    pub fn from_config(config: &ProviderConfig) -> Option<Self> {
        let api_key = config.search_api_key.clone()?;
        Some(Self::new(
            config.search_base_url.clone(),
            api_key,
            config.request_timeout,
        ))
    }

    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url,
            api_key,
            timeout,
        }
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    include_answer: bool,
    include_raw_content: bool,
    max_results: u32,
}

#[derive(Deserialize)]
struct SearchResponse {
    answer: Option<String>,
}

#[async_trait]
impl SearchBackend for TavilyBackend {
    async fn search(&self, query: &str) -> Result<SearchAnswer> {
        let request = SearchRequest {
            api_key: &self.api_key,
            query,
            search_depth: "basic",
            include_answer: true,
            include_raw_content: false,
            max_results: defaults::SEARCH_MAX_RESULTS,
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Provider {
                status: None,
                message: format!("Search request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Provider {
                status: Some(status.as_u16()),
                message: format!("Search returned {}: {}", status, body),
            });
        }

        let result: SearchResponse = response.json().await.map_err(|e| Error::Provider {
            status: Some(status.as_u16()),
            message: format!("Failed to parse search response: {}", e),
        })?;

        debug!(
            subsystem = "inference",
            component = "tavily",
            has_answer = result.answer.is_some(),
            "Search finished"
        );
        Ok(SearchAnswer {
            answer: result.answer,
        })
    }
}
