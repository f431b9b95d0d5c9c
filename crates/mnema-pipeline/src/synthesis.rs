//! Study-material synthesis stage.
//!
//! Builds a single structured generation request out of the note text,
//! optional images, and optional research context, then parses the
//! provider text into [`StudyMaterials`]. Model/key escalation is the
//! fallback controller's job; parsing failures are this stage's own
//! error class, distinct from provider failures.

use std::sync::Arc;

use tracing::{debug, info};

use mnema_core::{
    defaults, CompletionBackend, ContentPart, GenerationParams, ImageAttachment, Result,
    StudyMaterials,
};
use mnema_inference::extract::parse_json_object;

use crate::fallback::FallbackController;

const SYNTHESIS_INSTRUCTION: &str = r#"You are an expert educator creating comprehensive study materials. Analyze the provided text notes and any images to create:
1. A clear, structured summary (include information from both text and images)
2. Key points (5-8 bullet points covering content from both sources)
3. Flashcards (8-12 cards with front/back, incorporating visual and text content)
4. Q&A pairs (6-10 questions with detailed answers based on all provided content)

Format your response as JSON with this structure:
{
  "summary": "detailed summary text",
  "keyPoints": ["point 1", "point 2", ...],
  "flashcards": [{"front": "question", "back": "answer"}, ...],
  "qa": [{"question": "question text", "answer": "detailed answer"}, ...]
}

Make the content educational, engaging, and comprehensive. If images are provided, analyze them and incorporate their content into the study materials."#;

/// Everything one synthesis call needs.
#[derive(Debug, Clone, Default)]
pub struct SynthesisInput {
    /// Original note text; absent for image-only submissions.
    pub content: Option<String>,
    pub images: Vec<ImageAttachment>,
    /// Research context from the enrichment stage, when any.
    pub research_context: Option<String>,
}

/// Build the full prompt text for one synthesis request.
fn build_prompt(input: &SynthesisInput) -> String {
    let mut prompt = String::from(SYNTHESIS_INSTRUCTION);
    prompt.push_str("\n\n");

    match input.content.as_deref().filter(|c| !c.trim().is_empty()) {
        Some(content) => {
            prompt.push_str("Original Notes:\n");
            prompt.push_str(content);
        }
        None => prompt.push_str("No text notes provided - analyze the images only."),
    }

    if let Some(context) = input
        .research_context
        .as_deref()
        .filter(|c| !c.is_empty())
    {
        prompt.push_str("\n\nAdditional Research Context:");
        prompt.push_str(context);
    }

    prompt
}

/// Assemble the ordered content parts: prompt text first, then images.
fn build_parts(input: &SynthesisInput) -> Vec<ContentPart> {
    let mut parts = vec![ContentPart::text(build_prompt(input))];
    for image in &input.images {
        parts.push(ContentPart::image(
            image.data.clone(),
            image.mime_type.clone(),
        ));
    }
    parts
}

/// Study-material synthesis, wrapped by the fallback controller.
pub struct SynthesisStage {
    completion: Arc<dyn CompletionBackend>,
    primary_model: String,
    fallback_models: Vec<String>,
}

impl SynthesisStage {
    pub fn new(
        completion: Arc<dyn CompletionBackend>,
        primary_model: impl Into<String>,
        fallback_models: Vec<String>,
    ) -> Self {
        Self {
            completion,
            primary_model: primary_model.into(),
            fallback_models,
        }
    }

    /// Run one synthesis call and parse the result.
    pub async fn synthesize(&self, input: &SynthesisInput) -> Result<StudyMaterials> {
        let parts = build_parts(input);
        let params = GenerationParams {
            temperature: defaults::SYNTHESIS_TEMPERATURE,
            max_output_tokens: defaults::SYNTHESIS_MAX_OUTPUT_TOKENS,
        };

        debug!(
            subsystem = "pipeline",
            component = "synthesis",
            image_count = input.images.len(),
            has_research = input.research_context.is_some(),
            "Requesting study materials"
        );

        let controller = FallbackController::new(
            self.completion.as_ref(),
            &self.primary_model,
            &self.fallback_models,
        );
        let response = controller.run(&parts, &params).await?;

        let materials: StudyMaterials = parse_json_object(&response)?;
        info!(
            subsystem = "pipeline",
            component = "synthesis",
            key_points = materials.key_points.len(),
            flashcards = materials.flashcards.len(),
            qa = materials.qa.len(),
            "Study materials generated"
        );
        Ok(materials)
    }
}
