//! Note creation and processing handlers.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::info;

use mnema_core::{CreateNoteRequest, Note, NoteRepository, ProcessNoteRequest};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct NoteResponse {
    pub success: bool,
    pub note: Note,
}

#[derive(Serialize)]
pub struct ProcessNoteResponse {
    pub success: bool,
    pub note: Note,
    #[serde(rename = "enhancedWithInternet")]
    pub enhanced_with_internet: bool,
}

/// POST /api/v1/notes: create a note record in `pending`.
pub async fn create_note(
    State(state): State<AppState>,
    Json(req): Json<CreateNoteRequest>,
) -> Result<Json<NoteResponse>, ApiError> {
    let note = state.db.notes.create(req).await?;
    info!(
        subsystem = "api",
        op = "create_note",
        note_id = %note.id,
        "Note created"
    );
    Ok(Json(NoteResponse {
        success: true,
        note,
    }))
}

/// POST /api/v1/notes/process: run the AI-processing pipeline.
pub async fn process_note(
    State(state): State<AppState>,
    Json(req): Json<ProcessNoteRequest>,
) -> Result<Json<ProcessNoteResponse>, ApiError> {
    let outcome = state.pipeline.process(req).await?;
    Ok(Json(ProcessNoteResponse {
        success: true,
        note: outcome.note,
        enhanced_with_internet: outcome.enhanced_with_internet,
    }))
}
