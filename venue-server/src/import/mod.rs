//! Bulk CSV ingestion for the song and product catalogs

pub mod rows;
pub mod service;

pub use service::{CsvImportService, ImportRowError, ImportSummary};
