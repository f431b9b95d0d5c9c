//! Wikipedia search/summary proxy for the study widget.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use mnema_core::{defaults, Error};

use crate::error::ApiError;
use crate::state::AppState;

/// Thin proxy over the public Wikipedia APIs, so the browser widget only
/// ever talks to this origin.
pub struct WikipediaProxy {
    client: reqwest::Client,
    base_url: String,
}

impl WikipediaProxy {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn from_defaults() -> Self {
        Self::new(defaults::WIKIPEDIA_BASE_URL.to_string())
    }

    async fn fetch_json(&self, url: String) -> Result<serde_json::Value, Error> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Provider {
                status: None,
                message: format!("Wikipedia request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Provider {
                status: Some(status.as_u16()),
                message: format!("Wikipedia returned {}", status),
            });
        }

        response.json().await.map_err(|e| Error::Provider {
            status: Some(status.as_u16()),
            message: format!("Failed to parse Wikipedia response: {}", e),
        })
    }

    /// Full-text article search.
    pub async fn search(&self, query: &str) -> Result<serde_json::Value, Error> {
        let url = format!(
            "{}/w/api.php?action=query&list=search&srsearch={}&format=json&origin=*",
            self.base_url,
            urlencoding::encode(query)
        );
        self.fetch_json(url).await
    }

    /// Article summary by title.
    pub async fn summary(&self, title: &str) -> Result<serde_json::Value, Error> {
        let url = format!(
            "{}/api/rest_v1/page/summary/{}",
            self.base_url,
            urlencoding::encode(title)
        );
        self.fetch_json(url).await
    }
}

#[derive(Deserialize)]
pub struct WikipediaParams {
    pub action: String,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// GET /api/v1/wikipedia: `action=search&query=...` or `action=summary&title=...`.
pub async fn wikipedia(
    State(state): State<AppState>,
    Query(params): Query<WikipediaParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let value = match params.action.as_str() {
        "search" => {
            let query = params
                .query
                .filter(|q| !q.is_empty())
                .ok_or_else(|| Error::InvalidInput("query is required".to_string()))?;
            state.wikipedia.search(&query).await?
        }
        "summary" => {
            let title = params
                .title
                .filter(|t| !t.is_empty())
                .ok_or_else(|| Error::InvalidInput("title is required".to_string()))?;
            state.wikipedia.summary(&title).await?
        }
        _ => return Err(Error::InvalidInput("Invalid action".to_string()).into()),
    };
    Ok(Json(value))
}
