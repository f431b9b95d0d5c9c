//! Model/key fallback controller.
//!
//! Wraps a synthesis attempt in an ordered candidate chain that escalates
//! only on quota-shaped failures. Attempts are strictly sequential: each
//! depends on knowing the previous one failed, and concurrent attempts
//! would double-bill and double-persist.

use tracing::{info, warn};

use mnema_core::{
    CompletionBackend, ContentPart, Error, GenerationParams, KeySlot, ProviderError, Result,
};

/// One (key, model) candidate in the escalation chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub slot: KeySlot,
    pub model: String,
}

/// Build the full candidate chain, first attempt included:
///
/// 1. Primary key + primary model.
/// 2. Secondary key + primary model (only when a secondary key exists).
/// 3..: each fallback model, under the secondary key when it exists,
///      otherwise the primary key.
pub fn candidate_chain(
    has_secondary_key: bool,
    primary_model: &str,
    fallback_models: &[String],
) -> Vec<Attempt> {
    let mut chain = vec![Attempt {
        slot: KeySlot::Primary,
        model: primary_model.to_string(),
    }];

    if has_secondary_key {
        chain.push(Attempt {
            slot: KeySlot::Secondary,
            model: primary_model.to_string(),
        });
    }

    let fallback_slot = if has_secondary_key {
        KeySlot::Secondary
    } else {
        KeySlot::Primary
    };
    for model in fallback_models {
        chain.push(Attempt {
            slot: fallback_slot,
            model: model.clone(),
        });
    }

    chain
}

/// Runs a completion through the candidate chain.
pub struct FallbackController<'a> {
    backend: &'a dyn CompletionBackend,
    primary_model: &'a str,
    fallback_models: &'a [String],
}

impl<'a> FallbackController<'a> {
    pub fn new(
        backend: &'a dyn CompletionBackend,
        primary_model: &'a str,
        fallback_models: &'a [String],
    ) -> Self {
        Self {
            backend,
            primary_model,
            fallback_models,
        }
    }

    /// Run the chain, stopping at the first success or non-quota error.
    ///
    /// Non-quota failures are reported immediately as a provider error
    /// and never consume further candidates. On exhaustion the first
    /// observed failure is what gets reported, under the quota-exhausted
    /// code.
    pub async fn run(&self, parts: &[ContentPart], params: &GenerationParams) -> Result<String> {
        let chain = candidate_chain(
            self.backend.has_secondary_key(),
            self.primary_model,
            self.fallback_models,
        );

        let mut first_failure: Option<ProviderError> = None;
        let mut attempts = 0usize;

        for attempt in &chain {
            attempts += 1;
            match self
                .backend
                .complete(attempt.slot, &attempt.model, parts, params)
                .await
            {
                Ok(text) => {
                    if attempts > 1 {
                        warn!(
                            subsystem = "pipeline",
                            component = "fallback",
                            model = %attempt.model,
                            attempts,
                            "Completion succeeded on fallback candidate"
                        );
                    }
                    return Ok(text);
                }
                Err(e) => {
                    if !e.is_quota_shaped() {
                        info!(
                            subsystem = "pipeline",
                            component = "fallback",
                            model = %attempt.model,
                            attempts,
                            error = %e,
                            "Non-quota provider error, not escalating"
                        );
                        return Err(e.into());
                    }
                    warn!(
                        subsystem = "pipeline",
                        component = "fallback",
                        model = %attempt.model,
                        attempts,
                        error = %e,
                        "Quota-shaped failure, escalating"
                    );
                    first_failure.get_or_insert(e);
                }
            }
        }

        // Exhausted: every candidate failed on quota. Report the first
        // observed failure.
        let first = first_failure.expect("chain is never empty");
        Err(Error::QuotaExhausted {
            status: first.status,
            message: first.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnema_inference::ScriptedCompletionBackend;

    fn params() -> GenerationParams {
        GenerationParams {
            temperature: 0.7,
            max_output_tokens: 4000,
        }
    }

    fn fallback_models() -> Vec<String> {
        vec![
            "gemini-1.5-flash".to_string(),
            "gemini-1.5-flash-8b".to_string(),
        ]
    }

    #[test]
    fn test_chain_with_secondary_key() {
        let chain = candidate_chain(true, "gemini-1.5-pro", &fallback_models());
        assert_eq!(
            chain,
            vec![
                Attempt {
                    slot: KeySlot::Primary,
                    model: "gemini-1.5-pro".to_string()
                },
                Attempt {
                    slot: KeySlot::Secondary,
                    model: "gemini-1.5-pro".to_string()
                },
                Attempt {
                    slot: KeySlot::Secondary,
                    model: "gemini-1.5-flash".to_string()
                },
                Attempt {
                    slot: KeySlot::Secondary,
                    model: "gemini-1.5-flash-8b".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_chain_without_secondary_key() {
        let chain = candidate_chain(false, "gemini-1.5-pro", &fallback_models());
        assert_eq!(chain.len(), 3);
        assert!(chain.iter().all(|a| a.slot == KeySlot::Primary));
        assert_eq!(chain[1].model, "gemini-1.5-flash");
        assert_eq!(chain[2].model, "gemini-1.5-flash-8b");
    }

    #[tokio::test]
    async fn test_primary_success_makes_one_call() {
        let backend = ScriptedCompletionBackend::new()
            .with_secondary_key()
            .push_ok("done");
        let models = fallback_models();
        let controller = FallbackController::new(&backend, "gemini-1.5-pro", &models);

        let text = controller
            .run(&[ContentPart::text("p")], &params())
            .await
            .unwrap();
        assert_eq!(text, "done");
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_escalation_order_reaches_final_candidate() {
        let backend = ScriptedCompletionBackend::new()
            .with_secondary_key()
            .push_err(ProviderError::new(Some(429), "quota"))
            .push_err(ProviderError::new(Some(429), "quota"))
            .push_err(ProviderError::new(Some(429), "quota"))
            .push_ok("from the lightest model");
        let models = fallback_models();
        let controller = FallbackController::new(&backend, "gemini-1.5-pro", &models);

        let text = controller
            .run(&[ContentPart::text("p")], &params())
            .await
            .unwrap();
        assert_eq!(text, "from the lightest model");

        let calls = backend.calls();
        let order: Vec<(KeySlot, &str)> = calls
            .iter()
            .map(|c| (c.slot, c.model.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                (KeySlot::Primary, "gemini-1.5-pro"),
                (KeySlot::Secondary, "gemini-1.5-pro"),
                (KeySlot::Secondary, "gemini-1.5-flash"),
                (KeySlot::Secondary, "gemini-1.5-flash-8b"),
            ]
        );
    }

    #[tokio::test]
    async fn test_non_quota_error_terminates_immediately() {
        let backend = ScriptedCompletionBackend::new()
            .with_secondary_key()
            .push_err(ProviderError::new(Some(400), "malformed request"));
        let models = fallback_models();
        let controller = FallbackController::new(&backend, "gemini-1.5-pro", &models);

        let err = controller
            .run(&[ContentPart::text("p")], &params())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "PROVIDER_ERROR");
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_preserves_first_failure() {
        let backend = ScriptedCompletionBackend::new()
            .push_err(ProviderError::new(Some(429), "primary quota hit"))
            .push_err(ProviderError::new(Some(503), "rate limited later"))
            .push_err(ProviderError::new(Some(503), "rate limited later"));
        let models = fallback_models();
        let controller = FallbackController::new(&backend, "gemini-1.5-pro", &models);

        let err = controller
            .run(&[ContentPart::text("p")], &params())
            .await
            .unwrap_err();
        match err {
            Error::QuotaExhausted { status, message } => {
                assert_eq!(status, Some(429));
                assert_eq!(message, "primary quota hit");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // No secondary key: primary-key chain is pro, flash, flash-8b.
        assert_eq!(backend.call_count(), 3);
    }

    #[tokio::test]
    async fn test_quota_then_non_quota_stops_mid_chain() {
        let backend = ScriptedCompletionBackend::new()
            .with_secondary_key()
            .push_err(ProviderError::new(Some(429), "quota"))
            .push_err(ProviderError::new(Some(401), "bad key"));
        let models = fallback_models();
        let controller = FallbackController::new(&backend, "gemini-1.5-pro", &models);

        let err = controller
            .run(&[ContentPart::text("p")], &params())
            .await
            .unwrap_err();
        // The non-quota failure is what stops and reports the chain.
        assert_eq!(err.code(), "PROVIDER_ERROR");
        assert_eq!(err.provider_status(), Some(401));
        assert_eq!(backend.call_count(), 2);
    }
}
