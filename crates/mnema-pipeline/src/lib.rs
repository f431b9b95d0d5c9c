//! # mnema-pipeline
//!
//! The note/quiz AI-processing pipeline.
//!
//! This crate provides:
//! - Content extraction stage (image to text via a vision completion)
//! - Research enrichment stage (topic extraction + shallow web search)
//! - Study-material synthesis stage (strict structured generation)
//! - Model/key fallback controller for quota-shaped failures
//! - Quiz generation stage (10 validated MCQs with rollback persistence)
//! - The note-processing orchestrator tying the stages together

pub mod enrichment;
pub mod extraction;
pub mod fallback;
pub mod process;
pub mod quiz;
pub mod synthesis;

// Re-export core types
pub use mnema_core::*;

pub use enrichment::{EnrichmentResult, EnrichmentStage, TopicOutcome, TopicResolution};
pub use extraction::{TextExtractionStage, NO_TEXT_SENTINEL};
pub use fallback::{Attempt, FallbackController};
pub use process::{NotePipeline, ProcessOutcome};
pub use quiz::QuizGenerator;
pub use synthesis::{SynthesisInput, SynthesisStage};
