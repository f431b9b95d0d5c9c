//! Gemini completion backend implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use mnema_core::{
    CompletionBackend, ContentPart, GenerationParams, KeySlot, ProviderConfig, ProviderError,
};

/// Gemini generative-language completion backend.
///
/// Holds both configured API keys; the caller picks a [`KeySlot`] per
/// call, which is what lets the fallback controller escalate without the
/// client carrying any retry logic of its own.
pub struct GeminiBackend {
    client: Client,
    base_url: String,
    api_key: String,
    api_key_secondary: Option<String>,
    timeout: Duration,
}

impl GeminiBackend {
    /// Create a backend from provider configuration.
    pub fn new(config: &ProviderConfig) -> Self {
        Self::with_keys(
            config.gemini_base_url.clone(),
            config.gemini_api_key.clone(),
            config.gemini_api_key_secondary.clone(),
            config.request_timeout,
        )
    }

    /// Create a backend with explicit keys (used by tests).
    pub fn with_keys(
        base_url: String,
        api_key: String,
        api_key_secondary: Option<String>,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url,
            api_key,
            api_key_secondary,
            timeout,
        }
    }

    fn key_for(&self, slot: KeySlot) -> Result<&str, ProviderError> {
        match slot {
            KeySlot::Primary => Ok(&self.api_key),
            KeySlot::Secondary => self
                .api_key_secondary
                .as_deref()
                .ok_or_else(|| ProviderError::transport("Secondary API key is not configured")),
        }
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<PartPayload<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum PartPayload<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
struct InlineData<'a> {
    data: &'a str,
    mime_type: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
    message: Option<String>,
}

fn wire_parts<'a>(parts: &'a [ContentPart]) -> Vec<PartPayload<'a>> {
    parts
        .iter()
        .map(|part| match part {
            ContentPart::Text(text) => PartPayload::Text { text },
            ContentPart::InlineImage { data, mime_type } => PartPayload::Inline {
                inline_data: InlineData { data, mime_type },
            },
        })
        .collect()
}

/// Pull the provider's error message out of an error body, falling back
/// to the raw text when it isn't the usual envelope.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|error| error.message)
        .unwrap_or_else(|| {
            if body.is_empty() {
                "Unknown error".to_string()
            } else {
                body.to_string()
            }
        })
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    async fn complete(
        &self,
        slot: KeySlot,
        model: &str,
        parts: &[ContentPart],
        params: &GenerationParams,
    ) -> Result<String, ProviderError> {
        let start = Instant::now();
        let key = self.key_for(slot)?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: wire_parts(parts),
            }],
            generation_config: GenerationConfig {
                temperature: params.temperature,
                max_output_tokens: params.max_output_tokens,
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, model
        );
        let response = self
            .client
            .post(&url)
            .query(&[("key", key)])
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::transport(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body);
            warn!(
                subsystem = "inference",
                component = "gemini",
                model,
                status = status.as_u16(),
                "Completion request rejected"
            );
            return Err(ProviderError::new(Some(status.as_u16()), message));
        }

        let result: GenerateContentResponse = response.json().await.map_err(|e| {
            ProviderError::new(
                Some(status.as_u16()),
                format!("Failed to parse response: {}", e),
            )
        })?;

        let text = result
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| {
                ProviderError::new(Some(status.as_u16()), "Invalid response format: no candidates")
            })?;

        debug!(
            subsystem = "inference",
            component = "gemini",
            model,
            response_len = text.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Completion finished"
        );
        Ok(text)
    }

    fn has_secondary_key(&self) -> bool {
        self.api_key_secondary.is_some()
    }
}
