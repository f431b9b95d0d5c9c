//! Content extraction stage: image to text via a vision completion.

use std::sync::Arc;

use tracing::{debug, info};

use mnema_core::{
    defaults, CompletionBackend, ContentPart, GenerationParams, ImageAttachment, KeySlot, Result,
};

/// Sentinel the model is instructed to return when an image holds no text.
pub const NO_TEXT_SENTINEL: &str = "No text detected in the image.";

const EXTRACTION_PROMPT: &str = "Extract all text from this image. Please return only the \
extracted text content, maintaining the original formatting and structure as much as possible. \
If there are multiple sections, separate them clearly. If no text is found, return \
\"No text detected in the image.\"";

/// Single-call OCR stage. Any transport or provider error surfaces as an
/// extraction failure; there is no retry.
pub struct TextExtractionStage {
    completion: Arc<dyn CompletionBackend>,
    model: String,
}

impl TextExtractionStage {
    pub fn new(completion: Arc<dyn CompletionBackend>, model: impl Into<String>) -> Self {
        Self {
            completion,
            model: model.into(),
        }
    }

    /// Extract text from one image.
    pub async fn extract(&self, image: &ImageAttachment) -> Result<String> {
        debug!(
            subsystem = "pipeline",
            component = "extraction",
            mime_type = %image.mime_type,
            "Extracting text from image"
        );

        let parts = [
            ContentPart::text(EXTRACTION_PROMPT),
            ContentPart::image(image.data.clone(), image.mime_type.clone()),
        ];
        let params = GenerationParams {
            temperature: defaults::EXTRACTION_TEMPERATURE,
            max_output_tokens: defaults::EXTRACTION_MAX_OUTPUT_TOKENS,
        };

        let text = self
            .completion
            .complete(KeySlot::Primary, &self.model, &parts, &params)
            .await?;

        info!(
            subsystem = "pipeline",
            component = "extraction",
            response_len = text.len(),
            "Text extraction completed"
        );
        Ok(text)
    }
}
