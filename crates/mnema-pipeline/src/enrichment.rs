//! Research enrichment stage.
//!
//! Best-effort by design: a topic-extraction failure yields an empty
//! context, and one topic's search failure contributes nothing without
//! aborting the other. The pipeline never fails because of enrichment.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use mnema_core::{
    defaults, CompletionBackend, ContentPart, GenerationParams, KeySlot, Result, SearchBackend,
};

const TOPIC_PROMPT_PREFIX: &str =
    "Extract 2-3 key research topics from the provided notes. Return only the topics, one per line.";

/// Why a topic did or did not contribute to the research context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicResolution {
    /// The search produced a synthesized answer.
    Answered(String),
    /// The topic contributed nothing; the reason is kept for inspection.
    Skipped { reason: String },
}

/// Outcome for one researched topic.
#[derive(Debug, Clone)]
pub struct TopicOutcome {
    pub topic: String,
    pub resolution: TopicResolution,
}

/// Result of an enrichment run.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentResult {
    /// Concatenated research blocks; empty when nothing contributed.
    pub context: String,
    /// Per-topic outcomes, in topic order.
    pub outcomes: Vec<TopicOutcome>,
}

impl EnrichmentResult {
    pub fn is_empty(&self) -> bool {
        self.context.is_empty()
    }
}

/// Research enrichment: extract topics from the note text, search each
/// concurrently, and concatenate synthesized answers.
pub struct EnrichmentStage {
    completion: Arc<dyn CompletionBackend>,
    search: Arc<dyn SearchBackend>,
    model: String,
}

impl EnrichmentStage {
    pub fn new(
        completion: Arc<dyn CompletionBackend>,
        search: Arc<dyn SearchBackend>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            completion,
            search,
            model: model.into(),
        }
    }

    /// Ask the model for candidate research topics, one per line.
    async fn extract_topics(&self, content: &str) -> Result<Vec<String>> {
        let prompt = format!("{}\n\nNotes: {}", TOPIC_PROMPT_PREFIX, content);
        let params = GenerationParams {
            temperature: defaults::TOPIC_TEMPERATURE,
            max_output_tokens: defaults::TOPIC_MAX_OUTPUT_TOKENS,
        };

        let response = self
            .completion
            .complete(
                KeySlot::Primary,
                &self.model,
                &[ContentPart::text(prompt)],
                &params,
            )
            .await
            .map_err(mnema_core::Error::from)?;

        let topics: Vec<String> = response
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        Ok(topics)
    }

    /// Run enrichment over the note text.
    ///
    /// Never fails: all errors degrade to an empty or partial context.
    pub async fn enrich(&self, content: &str) -> EnrichmentResult {
        let topics = match self.extract_topics(content).await {
            Ok(topics) => topics,
            Err(e) => {
                warn!(
                    subsystem = "pipeline",
                    component = "enrichment",
                    error = %e,
                    "Topic extraction failed, continuing without research context"
                );
                return EnrichmentResult::default();
            }
        };

        // Enrichment is intentionally shallow: only the first topics are
        // searched, concurrently.
        let topics: Vec<String> = topics.into_iter().take(defaults::TOPIC_LIMIT).collect();
        debug!(
            subsystem = "pipeline",
            component = "enrichment",
            topic_count = topics.len(),
            "Researching topics"
        );

        let searches = topics.iter().map(|topic| self.search.search(topic));
        let results = join_all(searches).await;

        let mut context = String::new();
        let mut outcomes = Vec::with_capacity(topics.len());
        for (topic, result) in topics.into_iter().zip(results) {
            let resolution = match result {
                Ok(answer) => match answer.answer.filter(|a| !a.is_empty()) {
                    Some(answer) => {
                        context.push_str(&format!(
                            "\n\n## Research on \"{}\":\n{}",
                            topic, answer
                        ));
                        TopicResolution::Answered(answer)
                    }
                    None => TopicResolution::Skipped {
                        reason: "search returned no synthesized answer".to_string(),
                    },
                },
                Err(e) => {
                    warn!(
                        subsystem = "pipeline",
                        component = "enrichment",
                        topic = %topic,
                        error = %e,
                        "Topic search failed, skipping"
                    );
                    TopicResolution::Skipped {
                        reason: e.to_string(),
                    }
                }
            };
            outcomes.push(TopicOutcome { topic, resolution });
        }

        EnrichmentResult { context, outcomes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnema_core::ProviderError;
    use mnema_inference::{ScriptedCompletionBackend, ScriptedSearchBackend};

    #[tokio::test]
    async fn test_enrich_builds_context_blocks() {
        let completion =
            Arc::new(ScriptedCompletionBackend::new().push_ok("Budgeting\nProject timelines\n"));
        let search = Arc::new(
            ScriptedSearchBackend::new()
                .with_answer("Budgeting", "Budgets allocate money.")
                .with_answer("Project timelines", "Timelines order work."),
        );
        let stage = EnrichmentStage::new(completion, search, "gemini-1.5-flash");

        let result = stage.enrich("meeting notes").await;
        assert!(result
            .context
            .contains("## Research on \"Budgeting\":\nBudgets allocate money."));
        assert!(result
            .context
            .contains("## Research on \"Project timelines\":\nTimelines order work."));
        assert_eq!(result.outcomes.len(), 2);
    }

    #[tokio::test]
    async fn test_topics_capped_at_two() {
        let completion =
            Arc::new(ScriptedCompletionBackend::new().push_ok("one\ntwo\nthree\nfour"));
        let search = Arc::new(
            ScriptedSearchBackend::new()
                .with_answer("one", "a1")
                .with_answer("two", "a2")
                .with_answer("three", "a3"),
        );
        let stage = EnrichmentStage::new(completion, search.clone(), "gemini-1.5-flash");

        let result = stage.enrich("notes").await;
        assert_eq!(result.outcomes.len(), 2);
        assert_eq!(search.queries(), vec!["one", "two"]);
        assert!(!result.context.contains("a3"));
    }

    #[tokio::test]
    async fn test_blank_lines_discarded() {
        let completion =
            Arc::new(ScriptedCompletionBackend::new().push_ok("\n  \nGraph theory\n\n"));
        let search =
            Arc::new(ScriptedSearchBackend::new().with_answer("Graph theory", "nodes and edges"));
        let stage = EnrichmentStage::new(completion, search.clone(), "gemini-1.5-flash");

        let result = stage.enrich("notes").await;
        assert_eq!(search.queries(), vec!["Graph theory"]);
        assert_eq!(result.outcomes.len(), 1);
    }

    #[tokio::test]
    async fn test_one_failed_search_does_not_abort_the_other() {
        let completion = Arc::new(ScriptedCompletionBackend::new().push_ok("alpha\nbeta"));
        let search = Arc::new(
            ScriptedSearchBackend::new()
                .with_failure("alpha")
                .with_answer("beta", "beta answer"),
        );
        let stage = EnrichmentStage::new(completion, search, "gemini-1.5-flash");

        let result = stage.enrich("notes").await;
        assert!(matches!(
            result.outcomes[0].resolution,
            TopicResolution::Skipped { .. }
        ));
        assert_eq!(
            result.outcomes[1].resolution,
            TopicResolution::Answered("beta answer".to_string())
        );
        assert!(result.context.contains("beta answer"));
        assert!(!result.context.contains("alpha"));
    }

    #[tokio::test]
    async fn test_topic_extraction_failure_yields_empty_context() {
        let completion = Arc::new(
            ScriptedCompletionBackend::new().push_err(ProviderError::new(Some(500), "down")),
        );
        let search = Arc::new(ScriptedSearchBackend::new());
        let stage = EnrichmentStage::new(completion, search.clone(), "gemini-1.5-flash");

        let result = stage.enrich("notes").await;
        assert!(result.is_empty());
        assert!(result.outcomes.is_empty());
        assert!(search.queries().is_empty());
    }

    #[tokio::test]
    async fn test_answerless_search_is_skipped_with_reason() {
        let completion = Arc::new(ScriptedCompletionBackend::new().push_ok("gamma"));
        let search = Arc::new(ScriptedSearchBackend::new());
        let stage = EnrichmentStage::new(completion, search, "gemini-1.5-flash");

        let result = stage.enrich("notes").await;
        assert!(result.is_empty());
        match &result.outcomes[0].resolution {
            TopicResolution::Skipped { reason } => {
                assert!(reason.contains("no synthesized answer"));
            }
            other => panic!("unexpected resolution: {:?}", other),
        }
    }
}
