//! Audio transcription handler.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use mnema_core::{Error, TranscriptionBackend};

use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/v1/transcribe-audio: raw audio body in, text out.
///
/// Quota exhaustion gets its own body shape so voice-input callers can
/// tell "try again tomorrow" from a transcription fault.
pub async fn transcribe_audio(State(state): State<AppState>, body: Bytes) -> Response {
    let Some(backend) = state.transcription.as_ref() else {
        return ApiError(Error::Config(
            "Transcription credentials not configured".to_string(),
        ))
        .into_response();
    };

    if body.is_empty() {
        return ApiError(Error::InvalidInput("No audio provided".to_string())).into_response();
    }

    match backend.transcribe(&body).await {
        Ok(text) => Json(serde_json::json!({ "text": text })).into_response(),
        Err(e @ Error::QuotaExhausted { .. }) => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({
                "error": e.to_string(),
                "isQuotaError": true,
            })),
        )
            .into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}
