//! Scripted mock backends for deterministic pipeline testing.
//!
//! Always compiled so downstream crates' integration tests can drive the
//! pipeline without a live provider. The completion mock records every
//! call (key slot, model, prompt head) so tests can assert fallback
//! order and no-extra-call properties.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use mnema_core::{
    CompletionBackend, ContentPart, Error, GenerationParams, KeySlot, ProviderError, Result,
    SearchAnswer, SearchBackend,
};

/// One recorded completion call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub slot: KeySlot,
    pub model: String,
    /// Concatenated text parts of the request.
    pub prompt: String,
    /// Number of inline image parts in the request.
    pub image_count: usize,
}

/// Scripted completion backend.
///
/// Outcomes are consumed in FIFO order, one per call; once the script is
/// drained, the default response is returned.
pub struct ScriptedCompletionBackend {
    outcomes: Mutex<VecDeque<std::result::Result<String, ProviderError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    default_response: String,
    secondary_key: bool,
}

impl ScriptedCompletionBackend {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            default_response: "Mock response".to_string(),
            secondary_key: false,
        }
    }

    /// Pretend a secondary API key is configured.
    pub fn with_secondary_key(mut self) -> Self {
        self.secondary_key = true;
        self
    }

    /// Set the response returned once the script is drained.
    pub fn with_default_response(mut self, response: impl Into<String>) -> Self {
        self.default_response = response.into();
        self
    }

    /// Queue a successful outcome.
    pub fn push_ok(self, text: impl Into<String>) -> Self {
        self.outcomes.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    /// Queue a failed outcome.
    pub fn push_err(self, err: ProviderError) -> Self {
        self.outcomes.lock().unwrap().push_back(Err(err));
        self
    }

    /// All calls recorded so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of completion calls made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for ScriptedCompletionBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedCompletionBackend {
    async fn complete(
        &self,
        slot: KeySlot,
        model: &str,
        parts: &[ContentPart],
        _params: &GenerationParams,
    ) -> std::result::Result<String, ProviderError> {
        let prompt = parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text(text) => Some(text.as_str()),
                ContentPart::InlineImage { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n");
        let image_count = parts
            .iter()
            .filter(|p| matches!(p, ContentPart::InlineImage { .. }))
            .count();

        self.calls.lock().unwrap().push(RecordedCall {
            slot,
            model: model.to_string(),
            prompt,
            image_count,
        });

        match self.outcomes.lock().unwrap().pop_front() {
            Some(outcome) => outcome,
            None => Ok(self.default_response.clone()),
        }
    }

    fn has_secondary_key(&self) -> bool {
        self.secondary_key
    }
}

/// Scripted search backend: maps exact queries to answers, with an
/// optional error set for failure-policy tests.
pub struct ScriptedSearchBackend {
    answers: HashMap<String, String>,
    failing_queries: Vec<String>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedSearchBackend {
    pub fn new() -> Self {
        Self {
            answers: HashMap::new(),
            failing_queries: Vec::new(),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Map a query to a synthesized answer.
    pub fn with_answer(mut self, query: impl Into<String>, answer: impl Into<String>) -> Self {
        self.answers.insert(query.into(), answer.into());
        self
    }

    /// Make a specific query fail with a provider error.
    pub fn with_failure(mut self, query: impl Into<String>) -> Self {
        self.failing_queries.push(query.into());
        self
    }

    /// All queries issued so far.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Default for ScriptedSearchBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchBackend for ScriptedSearchBackend {
    async fn search(&self, query: &str) -> Result<SearchAnswer> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.failing_queries.iter().any(|q| q == query) {
            return Err(Error::Provider {
                status: Some(500),
                message: format!("scripted failure for {:?}", query),
            });
        }
        Ok(SearchAnswer {
            answer: self.answers.get(query).cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> GenerationParams {
        GenerationParams {
            temperature: 0.7,
            max_output_tokens: 100,
        }
    }

    #[tokio::test]
    async fn test_scripted_outcomes_consumed_in_order() {
        let backend = ScriptedCompletionBackend::new()
            .push_err(ProviderError::new(Some(429), "quota"))
            .push_ok("second");

        let parts = [ContentPart::text("hi")];
        let first = backend
            .complete(KeySlot::Primary, "m", &parts, &params())
            .await;
        assert!(first.is_err());

        let second = backend
            .complete(KeySlot::Primary, "m", &parts, &params())
            .await;
        assert_eq!(second.unwrap(), "second");

        // Script drained; default response from here on.
        let third = backend
            .complete(KeySlot::Primary, "m", &parts, &params())
            .await;
        assert_eq!(third.unwrap(), "Mock response");
        assert_eq!(backend.call_count(), 3);
    }

    #[tokio::test]
    async fn test_calls_record_slot_model_and_images() {
        let backend = ScriptedCompletionBackend::new().with_secondary_key();
        let parts = [
            ContentPart::text("prompt"),
            ContentPart::image("aGk=", "image/png"),
        ];
        backend
            .complete(KeySlot::Secondary, "gemini-1.5-pro", &parts, &params())
            .await
            .unwrap();

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].slot, KeySlot::Secondary);
        assert_eq!(calls[0].model, "gemini-1.5-pro");
        assert_eq!(calls[0].prompt, "prompt");
        assert_eq!(calls[0].image_count, 1);
    }

    #[tokio::test]
    async fn test_scripted_search() {
        let backend = ScriptedSearchBackend::new()
            .with_answer("topic a", "answer a")
            .with_failure("topic b");

        let hit = backend.search("topic a").await.unwrap();
        assert_eq!(hit.answer.as_deref(), Some("answer a"));

        assert!(backend.search("topic b").await.is_err());

        let miss = backend.search("topic c").await.unwrap();
        assert!(miss.answer.is_none());

        assert_eq!(backend.queries().len(), 3);
    }
}
