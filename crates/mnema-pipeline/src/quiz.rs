//! Quiz generation stage.
//!
//! A structurally similar, simpler sibling of the note pipeline: one
//! completion call, strict validation of exactly ten questions, and
//! atomic persistence with header rollback. No enrichment, no fallback
//! chain.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use mnema_core::{
    defaults, CompletionBackend, ContentPart, Error, GenerationParams, KeySlot, NewQuestion,
    NewQuiz, QuestionDraft, QuizRepository, Result,
};
use mnema_inference::extract::parse_json_object;

fn quiz_prompt(topic: &str) -> String {
    format!(
        r#"You are a quiz generator. Create exactly 10 multiple choice questions with 4 options each (A, B, C, D).
Each question should be challenging but fair, and cover different aspects of the topic.

Format your response as a JSON object with this exact structure:
{{
  "questions": [
    {{
      "question_text": "The question text here?",
      "option_a": "First option",
      "option_b": "Second option",
      "option_c": "Third option",
      "option_d": "Fourth option",
      "correct_answer": "A"
    }}
  ]
}}

Make sure:
- Exactly 10 questions
- correct_answer is always one of: A, B, C, or D
- Questions are varied and comprehensive
- All options are plausible but only one is correct

Create a quiz about: {topic}"#
    )
}

#[derive(Debug, Deserialize)]
struct QuizPayload {
    questions: Vec<QuestionDraft>,
}

/// Validate the parsed payload: exactly ten well-formed questions.
fn validate_questions(payload: QuizPayload) -> Result<Vec<NewQuestion>> {
    if payload.questions.len() != defaults::QUIZ_QUESTION_COUNT {
        return Err(Error::Validation(format!(
            "Expected exactly {} questions, got {}",
            defaults::QUIZ_QUESTION_COUNT,
            payload.questions.len()
        )));
    }
    payload
        .questions
        .into_iter()
        .map(QuestionDraft::validate)
        .collect()
}

/// Generates and persists a quiz from a topic description.
pub struct QuizGenerator {
    completion: Arc<dyn CompletionBackend>,
    quizzes: Arc<dyn QuizRepository>,
    model: String,
}

impl QuizGenerator {
    pub fn new(
        completion: Arc<dyn CompletionBackend>,
        quizzes: Arc<dyn QuizRepository>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            completion,
            quizzes,
            model: model.into(),
        }
    }

    /// Generate a quiz and return the created quiz id.
    pub async fn generate(
        &self,
        title: &str,
        description: Option<&str>,
        topic: &str,
        creator_id: Uuid,
    ) -> Result<Uuid> {
        if title.trim().is_empty() || topic.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Title and topic are required".to_string(),
            ));
        }

        debug!(
            subsystem = "pipeline",
            component = "quiz",
            topic,
            "Generating quiz"
        );

        let params = GenerationParams {
            temperature: defaults::SYNTHESIS_TEMPERATURE,
            max_output_tokens: defaults::SYNTHESIS_MAX_OUTPUT_TOKENS,
        };
        let response = self
            .completion
            .complete(
                KeySlot::Primary,
                &self.model,
                &[ContentPart::text(quiz_prompt(topic))],
                &params,
            )
            .await
            .map_err(Error::from)?;

        let payload: QuizPayload = parse_json_object(&response)?;
        let questions = validate_questions(payload)?;

        let quiz_id = self
            .quizzes
            .create_with_questions(
                NewQuiz {
                    title: title.to_string(),
                    description: description
                        .map(str::to_string)
                        .filter(|d| !d.is_empty()),
                    creator_id,
                    is_public: true,
                },
                &questions,
            )
            .await?;

        info!(
            subsystem = "pipeline",
            component = "quiz",
            quiz_id = %quiz_id,
            "Quiz generated"
        );
        Ok(quiz_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(answer: &str) -> serde_json::Value {
        serde_json::json!({
            "question_text": "Which traversal visits the root first?",
            "option_a": "Pre-order",
            "option_b": "In-order",
            "option_c": "Post-order",
            "option_d": "Level-order",
            "correct_answer": answer
        })
    }

    fn payload(count: usize) -> QuizPayload {
        let questions = serde_json::json!({
            "questions": (0..count).map(|_| draft("A")).collect::<Vec<_>>()
        });
        serde_json::from_value(questions).unwrap()
    }

    #[test]
    fn test_validate_accepts_exactly_ten() {
        let questions = validate_questions(payload(10)).unwrap();
        assert_eq!(questions.len(), 10);
    }

    #[test]
    fn test_validate_rejects_nine_and_eleven() {
        for count in [9, 11] {
            let err = validate_questions(payload(count)).unwrap_err();
            assert_eq!(err.code(), "VALIDATION_ERROR", "count = {}", count);
        }
    }

    #[test]
    fn test_validate_rejects_out_of_range_answer() {
        let mut value = serde_json::json!({
            "questions": (0..10).map(|_| draft("A")).collect::<Vec<_>>()
        });
        value["questions"][4] = draft("E");
        let payload: QuizPayload = serde_json::from_value(value).unwrap();
        let err = validate_questions(payload).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_quiz_prompt_names_the_topic() {
        let prompt = quiz_prompt("Binary Search Trees");
        assert!(prompt.contains("Create a quiz about: Binary Search Trees"));
        assert!(prompt.contains("Exactly 10 questions"));
    }
}
