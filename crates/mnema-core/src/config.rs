//! Process-wide configuration.
//!
//! Loaded once at startup (from the environment) and passed into each
//! stage at construction time; immutable thereafter. No module-level
//! mutable state.

use std::time::Duration;

use crate::defaults;
use crate::error::{Error, Result};

/// Credentials and endpoints for the external providers.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Gemini API base URL (overridable for tests).
    pub gemini_base_url: String,
    /// Primary Gemini API key.
    pub gemini_api_key: String,
    /// Optional secondary key used by the fallback chain.
    pub gemini_api_key_secondary: Option<String>,
    /// Tavily search base URL.
    pub search_base_url: String,
    /// Tavily API key; enrichment is disabled when absent.
    pub search_api_key: Option<String>,
    /// Workers AI base URL (transcription).
    pub workers_ai_base_url: String,
    /// Cloudflare account id for transcription; disabled when absent.
    pub cf_account_id: Option<String>,
    /// Cloudflare API token for transcription.
    pub cf_api_token: Option<String>,
    /// Per-request timeout for outbound provider calls.
    pub request_timeout: Duration,
}

impl ProviderConfig {
    /// Load from environment variables. The primary Gemini key is the
    /// only hard requirement.
    pub fn from_env() -> Result<Self> {
        let gemini_api_key = std::env::var(defaults::ENV_GEMINI_API_KEY)
            .map_err(|_| Error::Config(format!("{} is not set", defaults::ENV_GEMINI_API_KEY)))?;

        let request_timeout_secs = std::env::var(defaults::ENV_REQUEST_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::REQUEST_TIMEOUT_SECS);

        Ok(Self {
            gemini_base_url: std::env::var(defaults::ENV_GEMINI_BASE_URL)
                .unwrap_or_else(|_| defaults::GEMINI_BASE_URL.to_string()),
            gemini_api_key,
            gemini_api_key_secondary: non_empty_var(defaults::ENV_GEMINI_API_KEY_SECONDARY),
            search_base_url: std::env::var(defaults::ENV_TAVILY_BASE_URL)
                .unwrap_or_else(|_| defaults::TAVILY_BASE_URL.to_string()),
            search_api_key: non_empty_var(defaults::ENV_TAVILY_API_KEY),
            workers_ai_base_url: std::env::var(defaults::ENV_WORKERS_AI_BASE_URL)
                .unwrap_or_else(|_| defaults::WORKERS_AI_BASE_URL.to_string()),
            cf_account_id: non_empty_var(defaults::ENV_CF_ACCOUNT_ID),
            cf_api_token: non_empty_var(defaults::ENV_CF_API_TOKEN),
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }

    /// Whether the fallback chain has a secondary key to escalate to.
    pub fn has_secondary_key(&self) -> bool {
        self.gemini_api_key_secondary.is_some()
    }

    /// Whether research enrichment can run at all.
    pub fn search_enabled(&self) -> bool {
        self.search_api_key.is_some()
    }
}

/// Timeouts and model names governing a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Higher-quality model tried first for synthesis.
    pub primary_model: String,
    /// Models tried in order when the primary is quota-limited.
    pub fallback_models: Vec<String>,
    /// Fast model for topic extraction, OCR, and quiz generation.
    pub fast_model: String,
    /// Upper bound on a single stage.
    pub stage_timeout: Duration,
    /// Upper bound on a whole note-processing run.
    pub pipeline_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            primary_model: defaults::PRIMARY_GEN_MODEL.to_string(),
            fallback_models: vec![
                defaults::FALLBACK_GEN_MODEL.to_string(),
                defaults::LIGHT_FALLBACK_GEN_MODEL.to_string(),
            ],
            fast_model: defaults::FAST_GEN_MODEL.to_string(),
            stage_timeout: Duration::from_secs(defaults::STAGE_TIMEOUT_SECS),
            pipeline_timeout: Duration::from_secs(defaults::PIPELINE_TIMEOUT_SECS),
        }
    }
}

impl PipelineConfig {
    /// Load from environment variables (with defaults).
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(secs) = parse_secs(defaults::ENV_STAGE_TIMEOUT_SECS) {
            config.stage_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_secs(defaults::ENV_PIPELINE_TIMEOUT_SECS) {
            config.pipeline_timeout = Duration::from_secs(secs);
        }
        config
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(v) if !v.is_empty() => Some(v),
        _ => None,
    }
}

fn parse_secs(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse::<u64>().ok())
}
