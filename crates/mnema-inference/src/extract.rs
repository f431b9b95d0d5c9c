//! Best-effort extraction of a JSON object from LLM output.
//!
//! Providers routinely wrap JSON in prose or fenced code blocks. The
//! extraction order is: fenced block, then the slice from the first `{`
//! to the last `}`, then the raw trimmed text. The first candidate that
//! parses wins, so the parse-error boundary is testable in isolation
//! from any network call.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

use mnema_core::{Error, Result};

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```(?:json)?\s*(.*?)```").expect("fenced-block regex"));

/// Candidate JSON substrings in extraction order.
fn candidates(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    let mut out = Vec::new();

    if let Some(caps) = FENCED_BLOCK.captures(trimmed) {
        if let Some(inner) = caps.get(1) {
            let inner = inner.as_str().trim();
            if !inner.is_empty() {
                out.push(inner.to_string());
            }
        }
    }

    if let (Some(first), Some(last)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if first < last {
            out.push(trimmed[first..=last].to_string());
        }
    }

    out.push(trimmed.to_string());
    out
}

/// Extract the first substring of `text` that parses as a JSON object.
///
/// Returns `None` when no candidate parses. Idempotent: running the
/// result back through extraction yields the same object.
pub fn extract_json_object(text: &str) -> Option<String> {
    candidates(text)
        .into_iter()
        .find(|candidate| serde_json::from_str::<serde_json::Value>(candidate).is_ok())
}

/// Extract and deserialize a JSON object of type `T` from LLM output.
///
/// A response with no parseable object, or one that does not match the
/// expected shape, is a parse error, never partial success.
pub fn parse_json_object<T: DeserializeOwned>(text: &str) -> Result<T> {
    let mut shape_error: Option<String> = None;
    for candidate in candidates(text) {
        if serde_json::from_str::<serde_json::Value>(&candidate).is_err() {
            continue;
        }
        match serde_json::from_str::<T>(&candidate) {
            Ok(value) => return Ok(value),
            Err(e) => shape_error = Some(e.to_string()),
        }
    }
    match shape_error {
        Some(e) => Err(Error::Parse(format!(
            "Response JSON does not match the expected shape: {}",
            e
        ))),
        None => Err(Error::Parse(
            "Response contained no parseable JSON object".to_string(),
        )),
    }
}
