//! Note repository implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use mnema_core::{
    CreateNoteRequest, Error, Flashcard, Note, NoteRepository, ProcessingStatus, QaPair, Result,
    StudyMaterials,
};

const NOTE_COLUMNS: &str = "id, user_id, original_content, processing_status, summary, \
key_points, generated_flashcards, generated_qa, created_at, updated_at";

/// PostgreSQL implementation of NoteRepository.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn json_column<T: serde::de::DeserializeOwned>(row: &PgRow, column: &str) -> Result<Option<T>> {
    let value: Option<serde_json::Value> = row.try_get(column)?;
    match value {
        Some(value) => Ok(Some(serde_json::from_value(value).map_err(|e| {
            Error::Serialization(format!("Corrupt {} column: {}", column, e))
        })?)),
        None => Ok(None),
    }
}

fn map_note_row(row: PgRow) -> Result<Note> {
    let status: String = row.try_get("processing_status")?;
    Ok(Note {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        original_content: row.try_get("original_content")?,
        processing_status: ProcessingStatus::parse(&status)?,
        summary: row.try_get("summary")?,
        key_points: json_column::<Vec<String>>(&row, "key_points")?,
        generated_flashcards: json_column::<Vec<Flashcard>>(&row, "generated_flashcards")?,
        generated_qa: json_column::<Vec<QaPair>>(&row, "generated_qa")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn create(&self, req: CreateNoteRequest) -> Result<Note> {
        let id = Uuid::new_v4();
        let query = format!(
            "INSERT INTO notes (id, user_id, original_content, processing_status) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            NOTE_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(req.user_id)
            .bind(&req.content)
            .bind(ProcessingStatus::Pending.as_str())
            .fetch_one(&self.pool)
            .await?;
        map_note_row(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Note>> {
        let query = format!("SELECT {} FROM notes WHERE id = $1", NOTE_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(map_note_row).transpose()
    }

    async fn set_status(&self, id: Uuid, status: ProcessingStatus) -> Result<()> {
        let result =
            sqlx::query("UPDATE notes SET processing_status = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(status.as_str())
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }
        Ok(())
    }

    async fn complete(&self, id: Uuid, materials: &StudyMaterials) -> Result<Note> {
        // One UPDATE writes the terminal status and all four generated
        // fields together, so a reader can never observe a half-written
        // completion.
        let query = format!(
            "UPDATE notes SET \
                processing_status = $2, \
                summary = $3, \
                key_points = $4, \
                generated_flashcards = $5, \
                generated_qa = $6, \
                updated_at = now() \
             WHERE id = $1 RETURNING {}",
            NOTE_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(ProcessingStatus::Completed.as_str())
            .bind(&materials.summary)
            .bind(serde_json::to_value(&materials.key_points)?)
            .bind(serde_json::to_value(&materials.flashcards)?)
            .bind(serde_json::to_value(&materials.qa)?)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => map_note_row(row),
            None => Err(Error::NoteNotFound(id)),
        }
    }
}
