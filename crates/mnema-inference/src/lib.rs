//! # mnema-inference
//!
//! External provider clients for mnema.
//!
//! This crate provides:
//! - Gemini completion client (text + inline image parts, key-slot
//!   selection for the fallback chain)
//! - Tavily search client (synthesized answers only)
//! - Workers AI Whisper transcription client
//! - Best-effort JSON extraction from LLM output
//! - Scripted mock backends for deterministic pipeline tests

pub mod extract;
pub mod gemini;
pub mod mock;
pub mod search;
pub mod transcription;

// Re-export core types
pub use mnema_core::*;

pub use extract::{extract_json_object, parse_json_object};
pub use gemini::GeminiBackend;
pub use mock::{RecordedCall, ScriptedCompletionBackend, ScriptedSearchBackend};
pub use search::TavilyBackend;
pub use transcription::WhisperBackend;
