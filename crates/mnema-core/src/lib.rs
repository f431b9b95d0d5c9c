//! # mnema-core
//!
//! Core types, traits, and abstractions for mnema.
//!
//! This crate provides:
//! - The shared error taxonomy with machine-checkable error codes
//! - Note, quiz, and study-material data models
//! - Provider backend traits (completion, search, transcription)
//! - Persistence gateway traits (notes, quizzes, api tokens)
//! - Process-wide configuration loaded once at startup
//! - Structured logging field constants

pub mod config;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

pub use config::{PipelineConfig, ProviderConfig};
pub use error::{Error, Result};
pub use models::{
    AnswerLetter, CreateNoteRequest, Flashcard, ImageAttachment, NewQuestion, NewQuiz, Note,
    ProcessNoteRequest, ProcessingStatus, QaPair, QuestionDraft, Quiz, QuizQuestion,
    StudyMaterials,
};
pub use traits::{
    CompletionBackend, ContentPart, GenerationParams, KeySlot, NoteRepository, ProviderError,
    QuizRepository, SearchAnswer, SearchBackend, TokenRepository, TranscriptionBackend,
};
