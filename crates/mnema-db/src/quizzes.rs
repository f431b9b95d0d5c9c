//! Quiz and quiz-question repository implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use mnema_core::{
    AnswerLetter, Error, NewQuestion, NewQuiz, Quiz, QuizQuestion, QuizRepository, Result,
};

/// PostgreSQL implementation of QuizRepository.
#[derive(Clone)]
pub struct PgQuizRepository {
    pool: Pool<Postgres>,
}

impl PgQuizRepository {
    /// Create a new PgQuizRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_quiz_row(row: PgRow) -> Result<Quiz> {
    Ok(Quiz {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        creator_id: row.try_get("creator_id")?,
        is_public: row.try_get("is_public")?,
        created_at: row.try_get("created_at")?,
    })
}

fn map_question_row(row: PgRow) -> Result<QuizQuestion> {
    let answer: String = row.try_get("correct_answer")?;
    Ok(QuizQuestion {
        quiz_id: row.try_get("quiz_id")?,
        question_text: row.try_get("question_text")?,
        option_a: row.try_get("option_a")?,
        option_b: row.try_get("option_b")?,
        option_c: row.try_get("option_c")?,
        option_d: row.try_get("option_d")?,
        correct_answer: AnswerLetter::parse(&answer)
            .map_err(|_| Error::Internal(format!("Corrupt correct_answer: {:?}", answer)))?,
        question_number: row.try_get("question_number")?,
    })
}

#[async_trait]
impl QuizRepository for PgQuizRepository {
    async fn create_with_questions(
        &self,
        quiz: NewQuiz,
        questions: &[NewQuestion],
    ) -> Result<Uuid> {
        // Header and questions commit together: dropping the transaction
        // on a failed question insert rolls the header back, so no
        // orphaned empty quiz can survive.
        let mut tx = self.pool.begin().await?;

        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO quizzes (id, title, description, creator_id, is_public) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(&quiz.title)
        .bind(&quiz.description)
        .bind(quiz.creator_id)
        .bind(quiz.is_public)
        .execute(&mut *tx)
        .await?;

        for (index, question) in questions.iter().enumerate() {
            sqlx::query(
                "INSERT INTO quiz_questions \
                 (quiz_id, question_text, option_a, option_b, option_c, option_d, \
                  correct_answer, question_number) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(id)
            .bind(&question.question_text)
            .bind(&question.option_a)
            .bind(&question.option_b)
            .bind(&question.option_c)
            .bind(&question.option_d)
            .bind(question.correct_answer.as_str())
            .bind(index as i32 + 1)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(
            subsystem = "db",
            component = "quizzes",
            quiz_id = %id,
            question_count = questions.len(),
            "Quiz persisted"
        );
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Quiz>> {
        let row = sqlx::query(
            "SELECT id, title, description, creator_id, is_public, created_at \
             FROM quizzes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(map_quiz_row).transpose()
    }

    async fn questions(&self, quiz_id: Uuid) -> Result<Vec<QuizQuestion>> {
        let rows = sqlx::query(
            "SELECT quiz_id, question_text, option_a, option_b, option_c, option_d, \
             correct_answer, question_number \
             FROM quiz_questions WHERE quiz_id = $1 ORDER BY question_number",
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(map_question_row).collect()
    }
}
