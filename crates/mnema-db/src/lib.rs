//! # mnema-db
//!
//! PostgreSQL persistence gateway for mnema.
//!
//! This crate provides:
//! - Connection pool management
//! - Note repository (create, status transitions, terminal completion)
//! - Quiz repository (transactional header + question persistence)
//! - API token lookup for the opaque identity provider
//!
//! ## Example
//!
//! ```rust,ignore
//! use mnema_db::Database;
//! use mnema_core::{CreateNoteRequest, NoteRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/mnema").await?;
//!     let note = db.notes.create(CreateNoteRequest {
//!         user_id: uuid::Uuid::new_v4(),
//!         content: "Photosynthesis lecture".to_string(),
//!     }).await?;
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```

pub mod notes;
pub mod pool;
pub mod quizzes;
pub mod tokens;

// Re-export core types
pub use mnema_core::*;

pub use notes::PgNoteRepository;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};
pub use quizzes::PgQuizRepository;
pub use tokens::{hash_token, PgTokenRepository};

/// Aggregated repository handle over one connection pool.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Note repository.
    pub notes: PgNoteRepository,
    /// Quiz + question repository.
    pub quizzes: PgQuizRepository,
    /// API token repository.
    pub tokens: PgTokenRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            notes: PgNoteRepository::new(pool.clone()),
            quizzes: PgQuizRepository::new(pool.clone()),
            tokens: PgTokenRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect with default pool configuration.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = pool::create_pool(database_url).await?;
        Ok(Self::new(pool))
    }
}
