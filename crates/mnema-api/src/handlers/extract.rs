//! Image text-extraction handler.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use mnema_core::{Error, ImageAttachment};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ExtractTextRequest {
    /// Base64-encoded image payload.
    #[serde(default)]
    pub image: String,
    #[serde(default, alias = "mimeType")]
    pub mime_type: String,
}

#[derive(Serialize)]
pub struct ExtractTextResponse {
    pub success: bool,
    #[serde(rename = "extractedText")]
    pub extracted_text: String,
}

/// POST /api/v1/extract-text: single vision call, no retry.
pub async fn extract_text(
    State(state): State<AppState>,
    Json(req): Json<ExtractTextRequest>,
) -> Result<Json<ExtractTextResponse>, ApiError> {
    if req.image.is_empty() {
        return Err(Error::InvalidInput("No image provided".to_string()).into());
    }

    let extracted_text = state
        .extraction
        .extract(&ImageAttachment {
            data: req.image,
            mime_type: req.mime_type,
        })
        .await?;

    Ok(Json(ExtractTextResponse {
        success: true,
        extracted_text,
    }))
}
