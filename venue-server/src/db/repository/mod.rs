//! Repository Module
//!
//! CRUD operations over the embedded SurrealDB tables. All ids use the
//! `"table:id"` string form at the API boundary and `RecordId` internally.
//!
//! Mutations on documents that carry a `revision` counter (tables, orders)
//! are conditional writes: `... WHERE revision = $expected`, bumping the
//! counter on success. A missed condition surfaces as [`RepoError::Conflict`].

pub mod closing_history;
pub mod order;
pub mod product;
pub mod song;
pub mod user;
pub mod venue_table;

pub use closing_history::ClosingHistoryRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use song::SongRepository;
pub use user::UserRepository;
pub use venue_table::TableRepository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::not_found(msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Conflict(msg) => AppError::conflict(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with the shared database handle
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

/// Parse a `"table:id"` string into a `RecordId`, validating the table part
pub fn parse_id(table: &str, id: &str) -> RepoResult<surrealdb::RecordId> {
    let rid: surrealdb::RecordId = id
        .parse()
        .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
    if rid.table() != table {
        return Err(RepoError::Validation(format!(
            "Expected a {} id, got: {}",
            table, id
        )));
    }
    Ok(rid)
}
