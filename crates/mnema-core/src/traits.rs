//! Core traits for mnema abstractions.
//!
//! These traits define the seams between the pipeline and its external
//! collaborators (LLM provider, search provider, persistence gateway),
//! enabling pluggable backends and testability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// PROVIDER BACKENDS
// =============================================================================

/// One part of a multimodal completion request, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    /// Plain prompt text.
    Text(String),
    /// Inline image payload (base64) with its declared MIME type.
    InlineImage { data: String, mime_type: String },
}

impl ContentPart {
    pub fn text(s: impl Into<String>) -> Self {
        ContentPart::Text(s.into())
    }

    pub fn image(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        ContentPart::InlineImage {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Generation parameters passed through to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Which configured API key a completion call should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySlot {
    Primary,
    Secondary,
}

/// Error from a single provider call, before taxonomy classification.
///
/// The fallback controller inspects this to decide whether escalation is
/// warranted; everything else converts it into [`crate::Error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    /// Upstream HTTP status, when the provider responded at all.
    pub status: Option<u16>,
    pub message: String,
}

/// Keywords that mark an error message as quota/rate-limit shaped.
const QUOTA_KEYWORDS: [&str; 4] = ["quota", "insufficient", "exceed", "rate"];

impl ProviderError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Transport-level failure (no HTTP status observed).
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }

    /// True when this failure should trigger the model/key fallback chain:
    /// HTTP 429, or a message matching quota/insufficient/exceed/rate
    /// keywords, case-insensitive.
    pub fn is_quota_shaped(&self) -> bool {
        if self.status == Some(429) {
            return true;
        }
        let lowered = self.message.to_lowercase();
        QUOTA_KEYWORDS.iter().any(|kw| lowered.contains(kw))
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {})", self.message, status),
            None => f.write_str(&self.message),
        }
    }
}

impl From<ProviderError> for crate::Error {
    fn from(e: ProviderError) -> Self {
        crate::Error::Provider {
            status: e.status,
            message: e.message,
        }
    }
}

/// LLM completion backend accepting ordered text/image parts.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Run one completion under the given key slot and model.
    ///
    /// Returns the generated text, or a [`ProviderError`] carrying the
    /// upstream status for fallback classification. Implementations must
    /// not retry internally.
    async fn complete(
        &self,
        slot: KeySlot,
        model: &str,
        parts: &[ContentPart],
        params: &GenerationParams,
    ) -> std::result::Result<String, ProviderError>;

    /// Whether a secondary API key is configured.
    fn has_secondary_key(&self) -> bool;
}

/// Synthesized answer from a web-search call. Raw results are discarded
/// at the wire; only the answer survives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchAnswer {
    pub answer: Option<String>,
}

/// Web-search backend returning a synthesized answer for a query.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchAnswer>;
}

/// Audio-to-text transcription backend.
#[async_trait]
pub trait TranscriptionBackend: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String>;
}

// =============================================================================
// PERSISTENCE GATEWAY
// =============================================================================

/// Gateway operations on the notes record.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Create a note in `pending` status and return it.
    async fn create(&self, req: CreateNoteRequest) -> Result<Note>;

    /// Fetch a note by id.
    async fn get(&self, id: Uuid) -> Result<Option<Note>>;

    /// Transition the processing status. The only non-terminal write the
    /// pipeline performs.
    async fn set_status(&self, id: Uuid, status: ProcessingStatus) -> Result<()>;

    /// Single terminal write: set status `completed` together with all
    /// four generated fields.
    async fn complete(&self, id: Uuid, materials: &StudyMaterials) -> Result<Note>;
}

/// Gateway operations on the quizzes / quiz_questions record pair.
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Persist a quiz header plus its questions, numbered 1..N in the
    /// given order. Must leave no orphaned header if question insertion
    /// fails.
    async fn create_with_questions(
        &self,
        quiz: NewQuiz,
        questions: &[NewQuestion],
    ) -> Result<Uuid>;

    /// Fetch a quiz header by id.
    async fn get(&self, id: Uuid) -> Result<Option<Quiz>>;

    /// Fetch a quiz's questions ordered by `question_number`.
    async fn questions(&self, quiz_id: Uuid) -> Result<Vec<QuizQuestion>>;
}

/// Opaque identity lookup: bearer token hash to user id.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn resolve(&self, token_hash: &str) -> Result<Option<Uuid>>;
}
