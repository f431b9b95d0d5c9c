//! Quiz generation handler.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::bearer_user_id;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct GenerateQuizRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub topic: String,
}

#[derive(Serialize)]
pub struct GenerateQuizResponse {
    pub success: bool,
    pub quiz_id: Uuid,
}

/// POST /api/v1/quizzes/generate: authenticated quiz generation.
pub async fn generate_quiz(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<GenerateQuizRequest>,
) -> Result<Json<GenerateQuizResponse>, ApiError> {
    let creator_id = bearer_user_id(&state.db, &headers).await?;

    let quiz_id = state
        .quizzes
        .generate(&req.title, req.description.as_deref(), &req.topic, creator_id)
        .await?;

    Ok(Json(GenerateQuizResponse {
        success: true,
        quiz_id,
    }))
}
