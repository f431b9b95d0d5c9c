//! In-memory persistence gateway implementations for pipeline tests.

// Not every test file uses every helper here.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use mnema_core::{
    CreateNoteRequest, Error, NewQuestion, NewQuiz, Note, NoteRepository, ProcessingStatus, Quiz,
    QuizQuestion, QuizRepository, Result, StudyMaterials,
};

pub struct InMemoryNoteRepository {
    notes: Mutex<HashMap<Uuid, Note>>,
}

impl InMemoryNoteRepository {
    pub fn new() -> Self {
        Self {
            notes: Mutex::new(HashMap::new()),
        }
    }

    /// Seed a pending note with a known id, the way the submission
    /// handler would have created it.
    pub fn seed(&self, id: Uuid, content: &str) {
        let now = Utc::now();
        self.notes.lock().unwrap().insert(
            id,
            Note {
                id,
                user_id: Uuid::new_v4(),
                original_content: content.to_string(),
                processing_status: ProcessingStatus::Pending,
                summary: None,
                key_points: None,
                generated_flashcards: None,
                generated_qa: None,
                created_at: now,
                updated_at: now,
            },
        );
    }

    pub fn status_of(&self, id: Uuid) -> Option<ProcessingStatus> {
        self.notes
            .lock()
            .unwrap()
            .get(&id)
            .map(|n| n.processing_status)
    }

    pub fn get_sync(&self, id: Uuid) -> Option<Note> {
        self.notes.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl NoteRepository for InMemoryNoteRepository {
    async fn create(&self, req: CreateNoteRequest) -> Result<Note> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let note = Note {
            id,
            user_id: req.user_id,
            original_content: req.content,
            processing_status: ProcessingStatus::Pending,
            summary: None,
            key_points: None,
            generated_flashcards: None,
            generated_qa: None,
            created_at: now,
            updated_at: now,
        };
        self.notes.lock().unwrap().insert(id, note.clone());
        Ok(note)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Note>> {
        Ok(self.notes.lock().unwrap().get(&id).cloned())
    }

    async fn set_status(&self, id: Uuid, status: ProcessingStatus) -> Result<()> {
        let mut notes = self.notes.lock().unwrap();
        let note = notes.get_mut(&id).ok_or(Error::NoteNotFound(id))?;
        note.processing_status = status;
        note.updated_at = Utc::now();
        Ok(())
    }

    async fn complete(&self, id: Uuid, materials: &StudyMaterials) -> Result<Note> {
        let mut notes = self.notes.lock().unwrap();
        let note = notes.get_mut(&id).ok_or(Error::NoteNotFound(id))?;
        note.processing_status = ProcessingStatus::Completed;
        note.summary = Some(materials.summary.clone());
        note.key_points = Some(materials.key_points.clone());
        note.generated_flashcards = Some(materials.flashcards.clone());
        note.generated_qa = Some(materials.qa.clone());
        note.updated_at = Utc::now();
        Ok(note.clone())
    }
}

pub struct InMemoryQuizRepository {
    quizzes: Mutex<HashMap<Uuid, Quiz>>,
    questions: Mutex<HashMap<Uuid, Vec<QuizQuestion>>>,
    fail_question_insert: AtomicBool,
}

impl InMemoryQuizRepository {
    pub fn new() -> Self {
        Self {
            quizzes: Mutex::new(HashMap::new()),
            questions: Mutex::new(HashMap::new()),
            fail_question_insert: AtomicBool::new(false),
        }
    }

    /// Make the next question insertion fail after the header write, to
    /// exercise rollback.
    pub fn fail_question_insert(&self) {
        self.fail_question_insert.store(true, Ordering::SeqCst);
    }

    pub fn quiz_count(&self) -> usize {
        self.quizzes.lock().unwrap().len()
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn create_with_questions(
        &self,
        quiz: NewQuiz,
        questions: &[NewQuestion],
    ) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.quizzes.lock().unwrap().insert(
            id,
            Quiz {
                id,
                title: quiz.title,
                description: quiz.description,
                creator_id: quiz.creator_id,
                is_public: quiz.is_public,
                created_at: Utc::now(),
            },
        );

        if self.fail_question_insert.swap(false, Ordering::SeqCst) {
            // Roll the header back so no orphaned quiz survives.
            self.quizzes.lock().unwrap().remove(&id);
            return Err(Error::Internal("question insert failed".to_string()));
        }

        let rows = questions
            .iter()
            .enumerate()
            .map(|(index, q)| QuizQuestion {
                quiz_id: id,
                question_text: q.question_text.clone(),
                option_a: q.option_a.clone(),
                option_b: q.option_b.clone(),
                option_c: q.option_c.clone(),
                option_d: q.option_d.clone(),
                correct_answer: q.correct_answer,
                question_number: index as i32 + 1,
            })
            .collect();
        self.questions.lock().unwrap().insert(id, rows);
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Quiz>> {
        Ok(self.quizzes.lock().unwrap().get(&id).cloned())
    }

    async fn questions(&self, quiz_id: Uuid) -> Result<Vec<QuizQuestion>> {
        Ok(self
            .questions
            .lock()
            .unwrap()
            .get(&quiz_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// A study-materials response the provider could plausibly emit.
pub fn materials_response() -> String {
    serde_json::json!({
        "summary": "The meeting covered the project budget and the delivery timeline.",
        "keyPoints": [
            "Budget is capped at 40k",
            "Timeline targets Q3",
            "Two engineers join in May",
            "Vendor contract renews in June",
            "Risks tracked in the shared register",
            "Weekly status calls on Mondays"
        ],
        "flashcards": (0..9).map(|i| serde_json::json!({
            "front": format!("Question {i}"),
            "back": format!("Answer {i}")
        })).collect::<Vec<_>>(),
        "qa": (0..7).map(|i| serde_json::json!({
            "question": format!("What about item {i}?"),
            "answer": format!("Detail {i}")
        })).collect::<Vec<_>>(),
    })
    .to_string()
}

/// A well-formed ten-question quiz response.
pub fn quiz_response() -> String {
    let answers = ["A", "B", "C", "D", "A", "B", "C", "D", "A", "B"];
    serde_json::json!({
        "questions": answers.iter().enumerate().map(|(i, a)| serde_json::json!({
            "question_text": format!("Question {} about binary search trees?", i + 1),
            "option_a": "Option A",
            "option_b": "Option B",
            "option_c": "Option C",
            "option_d": "Option D",
            "correct_answer": a
        })).collect::<Vec<_>>()
    })
    .to_string()
}
