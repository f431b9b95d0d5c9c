//! Shared application state for the HTTP handlers.

use std::sync::Arc;

use mnema_db::Database;
use mnema_inference::WhisperBackend;
use mnema_pipeline::{NotePipeline, QuizGenerator, TextExtractionStage};

use crate::handlers::wikipedia::WikipediaProxy;

/// Everything a handler needs, assembled once at startup.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub pipeline: Arc<NotePipeline>,
    pub extraction: Arc<TextExtractionStage>,
    pub quizzes: Arc<QuizGenerator>,
    /// Absent when Cloudflare credentials are not configured.
    pub transcription: Option<Arc<WhisperBackend>>,
    pub wikipedia: Arc<WikipediaProxy>,
}
