//! HTTP handlers for mnema-api.

pub mod extract;
pub mod notes;
pub mod quizzes;
pub mod transcribe;
pub mod wikipedia;
