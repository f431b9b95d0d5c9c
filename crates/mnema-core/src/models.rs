//! Data models for notes, study materials, and quizzes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

// =============================================================================
// NOTES
// =============================================================================

/// Lifecycle status of a note's processing run.
///
/// A note is created `Pending`, moves to `Processing` when the pipeline
/// starts, and ends in exactly one terminal state. Terminal states are
/// never revisited automatically; re-processing targets a fresh note id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl ProcessingStatus {
    /// Stable string form used in the database column.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Error => "error",
        }
    }

    /// Parse the database string form.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(ProcessingStatus::Pending),
            "processing" => Ok(ProcessingStatus::Processing),
            "completed" => Ok(ProcessingStatus::Completed),
            "error" => Ok(ProcessingStatus::Error),
            other => Err(Error::Internal(format!(
                "Unknown processing status: {}",
                other
            ))),
        }
    }

    /// True for `Completed` and `Error`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessingStatus::Completed | ProcessingStatus::Error)
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One front/back flashcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

/// One question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// Structured output of the study-material synthesis stage.
///
/// Field names follow the generation contract (`keyPoints` etc.), which is
/// also the shape the provider is instructed to emit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyMaterials {
    pub summary: String,
    pub key_points: Vec<String>,
    pub flashcards: Vec<Flashcard>,
    pub qa: Vec<QaPair>,
}

/// One user-submitted unit of content and its derived materials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub original_content: String,
    pub processing_status: ProcessingStatus,
    /// Present only when `processing_status == Completed`, together with
    /// `key_points`, `generated_flashcards`, and `generated_qa`.
    pub summary: Option<String>,
    pub key_points: Option<Vec<String>>,
    pub generated_flashcards: Option<Vec<Flashcard>>,
    pub generated_qa: Option<Vec<QaPair>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for creating a new note record (status starts at `pending`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNoteRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub content: String,
}

/// One inline image submitted alongside a note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAttachment {
    /// Base64-encoded image payload.
    pub data: String,
    /// Declared MIME type, e.g. `image/png`.
    #[serde(alias = "mimeType")]
    pub mime_type: String,
}

/// Submit-for-processing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessNoteRequest {
    #[serde(alias = "noteId")]
    pub note_id: Uuid,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageAttachment>,
    #[serde(default, alias = "enhanceWithInternet")]
    pub enhance_with_internet: bool,
}

impl ProcessNoteRequest {
    /// Reject submissions with neither text nor images before any
    /// external provider is touched.
    pub fn validate(&self) -> Result<()> {
        let has_text = self
            .content
            .as_deref()
            .map(|c| !c.trim().is_empty())
            .unwrap_or(false);
        if !has_text && self.images.is_empty() {
            return Err(Error::InvalidInput(
                "Either content or images are required".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// QUIZZES
// =============================================================================

/// Correct-answer letter for a multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerLetter {
    A,
    B,
    C,
    D,
}

impl AnswerLetter {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerLetter::A => "A",
            AnswerLetter::B => "B",
            AnswerLetter::C => "C",
            AnswerLetter::D => "D",
        }
    }

    /// Parse a provider-emitted answer letter. Anything outside A–D is a
    /// validation error, never coerced.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim() {
            "A" => Ok(AnswerLetter::A),
            "B" => Ok(AnswerLetter::B),
            "C" => Ok(AnswerLetter::C),
            "D" => Ok(AnswerLetter::D),
            other => Err(Error::Validation(format!(
                "correct_answer must be one of A, B, C, D (got {:?})",
                other
            ))),
        }
    }
}

impl std::fmt::Display for AnswerLetter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub creator_id: Uuid,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new quiz header.
#[derive(Debug, Clone)]
pub struct NewQuiz {
    pub title: String,
    pub description: Option<String>,
    pub creator_id: Uuid,
    pub is_public: bool,
}

/// One persisted quiz question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub quiz_id: Uuid,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: AnswerLetter,
    /// 1-based display and answer order.
    pub question_number: i32,
}

/// A validated question ready for insertion (number assigned by the
/// gateway in generation order).
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: AnswerLetter,
}

/// Raw question shape as emitted by the provider, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionDraft {
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: String,
}

impl QuestionDraft {
    /// Validate one draft into an insertable question.
    pub fn validate(self) -> Result<NewQuestion> {
        if self.question_text.trim().is_empty() {
            return Err(Error::Validation("question_text is empty".to_string()));
        }
        for (label, option) in [
            ("option_a", &self.option_a),
            ("option_b", &self.option_b),
            ("option_c", &self.option_c),
            ("option_d", &self.option_d),
        ] {
            if option.trim().is_empty() {
                return Err(Error::Validation(format!("{} is empty", label)));
            }
        }
        let correct_answer = AnswerLetter::parse(&self.correct_answer)?;
        Ok(NewQuestion {
            question_text: self.question_text,
            option_a: self.option_a,
            option_b: self.option_b,
            option_c: self.option_c,
            option_d: self.option_d,
            correct_answer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_status_round_trip() {
        for status in [
            ProcessingStatus::Pending,
            ProcessingStatus::Processing,
            ProcessingStatus::Completed,
            ProcessingStatus::Error,
        ] {
            assert_eq!(ProcessingStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_processing_status_terminal() {
        assert!(!ProcessingStatus::Pending.is_terminal());
        assert!(!ProcessingStatus::Processing.is_terminal());
        assert!(ProcessingStatus::Completed.is_terminal());
        assert!(ProcessingStatus::Error.is_terminal());
    }

    #[test]
    fn test_processing_status_rejects_unknown() {
        assert!(ProcessingStatus::parse("done").is_err());
    }

    #[test]
    fn test_study_materials_wire_shape() {
        let json = r#"{
            "summary": "s",
            "keyPoints": ["a", "b"],
            "flashcards": [{"front": "f", "back": "b"}],
            "qa": [{"question": "q", "answer": "a"}]
        }"#;
        let materials: StudyMaterials = serde_json::from_str(json).unwrap();
        assert_eq!(materials.key_points.len(), 2);
        assert_eq!(materials.flashcards[0].front, "f");
        assert_eq!(materials.qa[0].answer, "a");
    }

    #[test]
    fn test_study_materials_missing_field_is_rejected() {
        let json = r#"{"summary": "s", "keyPoints": [], "flashcards": []}"#;
        assert!(serde_json::from_str::<StudyMaterials>(json).is_err());
    }

    #[test]
    fn test_process_request_requires_content_or_images() {
        let req = ProcessNoteRequest {
            note_id: Uuid::new_v4(),
            content: Some("   ".to_string()),
            images: vec![],
            enhance_with_internet: false,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_process_request_image_only_is_valid() {
        let req = ProcessNoteRequest {
            note_id: Uuid::new_v4(),
            content: None,
            images: vec![ImageAttachment {
                data: "aGk=".to_string(),
                mime_type: "image/png".to_string(),
            }],
            enhance_with_internet: false,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_process_request_accepts_camel_case_aliases() {
        let json = r#"{
            "noteId": "00000000-0000-0000-0000-000000000001",
            "content": "notes",
            "enhanceWithInternet": true,
            "images": [{"data": "aGk=", "mimeType": "image/png"}]
        }"#;
        let req: ProcessNoteRequest = serde_json::from_str(json).unwrap();
        assert!(req.enhance_with_internet);
        assert_eq!(req.images[0].mime_type, "image/png");
    }

    #[test]
    fn test_answer_letter_parse() {
        assert_eq!(AnswerLetter::parse("B").unwrap(), AnswerLetter::B);
        assert_eq!(AnswerLetter::parse(" D ").unwrap(), AnswerLetter::D);
        assert!(AnswerLetter::parse("E").is_err());
        assert!(AnswerLetter::parse("a").is_err());
    }

    #[test]
    fn test_question_draft_validation() {
        let draft = QuestionDraft {
            question_text: "What is 2 + 2?".to_string(),
            option_a: "3".to_string(),
            option_b: "4".to_string(),
            option_c: "5".to_string(),
            option_d: "6".to_string(),
            correct_answer: "B".to_string(),
        };
        let q = draft.validate().unwrap();
        assert_eq!(q.correct_answer, AnswerLetter::B);
    }

    #[test]
    fn test_question_draft_rejects_blank_option() {
        let draft = QuestionDraft {
            question_text: "q".to_string(),
            option_a: "a".to_string(),
            option_b: "".to_string(),
            option_c: "c".to_string(),
            option_d: "d".to_string(),
            correct_answer: "A".to_string(),
        };
        assert!(matches!(draft.validate(), Err(Error::Validation(_))));
    }
}
