//! Server state
//!
//! Shared handle passed to every handler. Cloning is shallow; the database
//! connection and the JWT service are reference-counted.

use std::path::PathBuf;
use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::billing::BillingService;
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{
    ClosingHistoryRepository, OrderRepository, ProductRepository, SongRepository, TableRepository,
    UserRepository,
};
use crate::import::CsvImportService;
use crate::search::SearchService;
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    pub fn new(config: Config, db: Surreal<Db>, jwt_service: Arc<JwtService>) -> Self {
        Self {
            config,
            db,
            jwt_service,
        }
    }

    /// Initialize against the on-disk database under `work_dir/database`
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| AppError::internal(format!("cannot create work dir: {}", e)))?;

        let db_service = DbService::new(&config.database_dir().join("venue.db"))
            .await
            .map_err(|e| AppError::internal(format!("database init failed: {}", e)))?;

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Ok(Self::new(config.clone(), db_service.db, jwt_service))
    }

    /// Initialize against an in-memory database, for tests
    pub async fn initialize_in_memory(config: &Config) -> AppResult<Self> {
        let db_service = DbService::memory()
            .await
            .map_err(|e| AppError::internal(format!("database init failed: {}", e)))?;
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Ok(Self::new(config.clone(), db_service.db, jwt_service))
    }

    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    // Repositories are cheap views over the shared connection

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.db.clone())
    }

    pub fn tables(&self) -> TableRepository {
        TableRepository::new(self.db.clone())
    }

    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.db.clone())
    }

    pub fn songs(&self) -> SongRepository {
        SongRepository::new(self.db.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.db.clone())
    }

    pub fn closings(&self) -> ClosingHistoryRepository {
        ClosingHistoryRepository::new(self.db.clone())
    }

    pub fn billing(&self) -> BillingService {
        BillingService::new(self.tables(), self.orders(), self.products(), self.closings())
    }

    pub fn search(&self) -> SearchService {
        SearchService::new(self.songs(), self.products())
    }

    pub fn importer(&self) -> CsvImportService {
        CsvImportService::new(self.songs(), self.products())
    }
}
