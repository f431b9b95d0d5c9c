//! Workers AI Whisper transcription backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use mnema_core::{Error, ProviderConfig, Result, TranscriptionBackend};

/// Cloudflare Workers AI Whisper backend for audio-to-text.
pub struct WhisperBackend {
    client: Client,
    base_url: String,
    account_id: String,
    api_token: String,
    timeout: Duration,
}

impl WhisperBackend {
    /// Create a backend from provider configuration. Returns `None` when
    /// Cloudflare credentials are not configured.
    pub fn from_config(config: &ProviderConfig) -> Option<Self> {
        let account_id = config.cf_account_id.clone()?;
        let api_token = config.cf_api_token.clone()?;
        Some(Self::new(
            config.workers_ai_base_url.clone(),
            account_id,
            api_token,
            config.request_timeout,
        ))
    }

    pub fn new(
        base_url: String,
        account_id: String,
        api_token: String,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url,
            account_id,
            api_token,
            timeout,
        }
    }
}

#[derive(Serialize)]
struct WhisperRequest<'a> {
    /// Audio bytes as an array of numbers, the shape Workers AI expects.
    audio: &'a [u8],
}

#[derive(Deserialize)]
struct WhisperResponse {
    result: Option<WhisperResult>,
}

#[derive(Deserialize)]
struct WhisperResult {
    text: Option<String>,
}

/// Quota detection for the transcription provider: HTTP 429 or
/// quota/limit keywords in the error body.
fn is_quota_limited(status: u16, body: &str) -> bool {
    if status == 429 {
        return true;
    }
    let lowered = body.to_lowercase();
    lowered.contains("quota") || lowered.contains("limit")
}

#[async_trait]
impl TranscriptionBackend for WhisperBackend {
    async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        let url = format!(
            "{}/accounts/{}/ai/run/@cf/openai/whisper",
            self.base_url, self.account_id
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .timeout(self.timeout)
            .json(&WhisperRequest { audio })
            .send()
            .await
            .map_err(|e| Error::Provider {
                status: None,
                message: format!("Transcription request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if is_quota_limited(status.as_u16(), &body) {
                return Err(Error::QuotaExhausted {
                    status: Some(status.as_u16()),
                    message: "Daily voice limit reached — please try again tomorrow.".to_string(),
                });
            }
            return Err(Error::Provider {
                status: Some(status.as_u16()),
                message: format!("Transcription returned {}: {}", status, body),
            });
        }

        let result: WhisperResponse = response.json().await.map_err(|e| Error::Provider {
            status: Some(status.as_u16()),
            message: format!("Failed to parse transcription response: {}", e),
        })?;

        let text = result
            .result
            .and_then(|r| r.text)
            .ok_or_else(|| Error::Provider {
                status: Some(status.as_u16()),
                message: "Transcription response carried no text".to_string(),
            })?;

        debug!(
            subsystem = "inference",
            component = "whisper",
            response_len = text.len(),
            "Transcription finished"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whisper_request_serializes_bytes_as_numbers() {
        let audio = [0u8, 127, 255];
        let json = serde_json::to_value(WhisperRequest { audio: &audio }).unwrap();
        assert_eq!(json["audio"], serde_json::json!([0, 127, 255]));
    }

    #[test]
    fn test_whisper_response_text_path() {
        let json = r#"{"result": {"text": "hello world"}, "success": true}"#;
        let response: WhisperResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.result.and_then(|r| r.text).as_deref(),
            Some("hello world")
        );
    }

    #[test]
    fn test_quota_detection() {
        assert!(is_quota_limited(429, ""));
        assert!(is_quota_limited(403, "daily quota reached"));
        assert!(is_quota_limited(500, "account LIMIT hit"));
        assert!(!is_quota_limited(500, "internal error"));
    }
}
