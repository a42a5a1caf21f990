//! Database Module
//!
//! Embedded SurrealDB storage. The schema is schemaless documents plus the
//! unique indexes that back the natural-key invariants (username, email,
//! table number, song code, product name).

pub mod models;
pub mod repository;

use crate::utils::AppError;
use std::path::Path;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

const NAMESPACE: &str = "venue";
const DATABASE: &str = "venue";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the on-disk database under `db_dir`
    pub async fn new(db_dir: &Path) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_dir)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        Self::prepare(db).await
    }

    /// In-memory database (tests)
    pub async fn memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;

        Self::prepare(db).await
    }

    async fn prepare(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        define_schema(&db).await?;

        tracing::info!("Database ready (ns={}, db={})", NAMESPACE, DATABASE);
        Ok(Self { db })
    }
}

/// Apply table and unique-index definitions (idempotent)
async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        "
        DEFINE TABLE IF NOT EXISTS user SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS user_username_idx ON TABLE user COLUMNS username UNIQUE;
        DEFINE INDEX IF NOT EXISTS user_email_idx ON TABLE user COLUMNS email UNIQUE;

        DEFINE TABLE IF NOT EXISTS venue_table SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS venue_table_number_idx ON TABLE venue_table COLUMNS table_number UNIQUE;

        DEFINE TABLE IF NOT EXISTS song SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS song_code_idx ON TABLE song COLUMNS code UNIQUE;

        DEFINE TABLE IF NOT EXISTS product SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS product_name_idx ON TABLE product COLUMNS name UNIQUE;

        DEFINE TABLE IF NOT EXISTS venue_order SCHEMALESS;
        DEFINE TABLE IF NOT EXISTS closing_history SCHEMALESS;
        ",
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?
    .check()
    .map_err(|e| AppError::database(format!("Schema definition rejected: {e}")))?;

    Ok(())
}
