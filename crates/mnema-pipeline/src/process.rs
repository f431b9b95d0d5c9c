//! Note-processing orchestrator.
//!
//! One invocation per note: validate, mark `processing`, optionally
//! enrich, synthesize under the fallback controller, then make exactly
//! one terminal write. No failure path may leave a note stuck in
//! `processing`.

use std::sync::Arc;
use std::time::Instant;

use tokio::time::timeout;
use tracing::{error, info, warn};

use mnema_core::{
    CompletionBackend, Error, Note, NoteRepository, PipelineConfig, ProcessNoteRequest,
    ProcessingStatus, Result, SearchBackend, StudyMaterials,
};

use crate::enrichment::EnrichmentStage;
use crate::synthesis::{SynthesisInput, SynthesisStage};

/// Successful pipeline outcome.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    /// The completed note, generated fields included.
    pub note: Note,
    /// Whether research context actually contributed to the prompt.
    pub enhanced_with_internet: bool,
}

/// The note-processing pipeline.
///
/// Stateless between invocations; all shared state lives in the
/// persistence gateway.
pub struct NotePipeline {
    notes: Arc<dyn NoteRepository>,
    synthesis: SynthesisStage,
    enrichment: Option<EnrichmentStage>,
    config: PipelineConfig,
}

impl NotePipeline {
    /// Assemble the pipeline. Enrichment is only available when a search
    /// backend is configured.
    pub fn new(
        notes: Arc<dyn NoteRepository>,
        completion: Arc<dyn CompletionBackend>,
        search: Option<Arc<dyn SearchBackend>>,
        config: PipelineConfig,
    ) -> Self {
        let synthesis = SynthesisStage::new(
            completion.clone(),
            config.primary_model.clone(),
            config.fallback_models.clone(),
        );
        let enrichment = search
            .map(|search| EnrichmentStage::new(completion, search, config.fast_model.clone()));
        Self {
            notes,
            synthesis,
            enrichment,
            config,
        }
    }

    /// Process one submitted note to a terminal status.
    pub async fn process(&self, req: ProcessNoteRequest) -> Result<ProcessOutcome> {
        let start = Instant::now();
        req.validate()?;

        self.notes
            .set_status(req.note_id, ProcessingStatus::Processing)
            .await?;

        let run = timeout(self.config.pipeline_timeout, self.run_stages(&req)).await;
        let result = match run {
            Ok(result) => result,
            Err(_) => Err(Error::Provider {
                status: None,
                message: "Pipeline deadline exceeded".to_string(),
            }),
        };

        match result {
            Ok((materials, enhanced_with_internet)) => {
                let note = self.notes.complete(req.note_id, &materials).await?;
                info!(
                    subsystem = "pipeline",
                    component = "process",
                    note_id = %req.note_id,
                    enhanced = enhanced_with_internet,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Note processed"
                );
                Ok(ProcessOutcome {
                    note,
                    enhanced_with_internet,
                })
            }
            Err(e) => {
                // Terminal write first, then report. The note must never
                // stay in `processing`.
                if let Err(status_err) = self
                    .notes
                    .set_status(req.note_id, ProcessingStatus::Error)
                    .await
                {
                    error!(
                        subsystem = "pipeline",
                        component = "process",
                        note_id = %req.note_id,
                        error = %status_err,
                        "Failed to record error status"
                    );
                }
                error!(
                    subsystem = "pipeline",
                    component = "process",
                    note_id = %req.note_id,
                    code = e.code(),
                    error = %e,
                    "Note processing failed"
                );
                Err(e)
            }
        }
    }

    /// Enrichment + synthesis, each bounded by the stage timeout.
    async fn run_stages(&self, req: &ProcessNoteRequest) -> Result<(StudyMaterials, bool)> {
        let mut research_context = None;

        if req.enhance_with_internet {
            research_context = self.enrich(req).await;
        }
        let enhanced = research_context.is_some();

        let input = SynthesisInput {
            content: req.content.clone(),
            images: req.images.clone(),
            research_context,
        };

        let materials = match timeout(self.config.stage_timeout, self.synthesis.synthesize(&input))
            .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(Error::Provider {
                    status: None,
                    message: "Synthesis stage timed out".to_string(),
                })
            }
        };

        Ok((materials, enhanced))
    }

    /// Best-effort enrichment: returns a non-empty context or nothing.
    async fn enrich(&self, req: &ProcessNoteRequest) -> Option<String> {
        let stage = self.enrichment.as_ref()?;
        // Topic extraction needs text to work from.
        let content = req.content.as_deref().filter(|c| !c.trim().is_empty())?;

        match timeout(self.config.stage_timeout, stage.enrich(content)).await {
            Ok(result) if !result.is_empty() => Some(result.context),
            Ok(_) => None,
            Err(_) => {
                warn!(
                    subsystem = "pipeline",
                    component = "enrichment",
                    note_id = %req.note_id,
                    "Enrichment timed out, continuing without research context"
                );
                None
            }
        }
    }
}
