//! CSV import service
//!
//! Streams an uploaded CSV row by row. Each good row upserts by its natural
//! key (song code, product name); each bad row becomes one entry in the
//! error list and never aborts the batch. The uploaded file is deleted once
//! the batch finishes, whatever the outcome.

use super::rows;
use crate::db::repository::{ProductRepository, SongRepository};
use crate::utils::{AppError, AppResult};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Outcome of one import batch
#[derive(Debug, Serialize)]
pub struct ImportSummary {
    /// True when every row imported cleanly
    pub success: bool,
    /// Rows upserted
    pub imported: u64,
    /// One entry per rejected row
    pub errors: Vec<ImportRowError>,
}

#[derive(Debug, Serialize)]
pub struct ImportRowError {
    /// 1-based data-row number (header excluded)
    pub row: u64,
    pub message: String,
}

#[derive(Clone)]
pub struct CsvImportService {
    songs: SongRepository,
    products: ProductRepository,
}

enum Catalog {
    Songs,
    Products,
}

impl CsvImportService {
    pub fn new(songs: SongRepository, products: ProductRepository) -> Self {
        Self { songs, products }
    }

    /// Import a song CSV from `path`, upserting by song code
    pub async fn import_songs(&self, path: &Path) -> AppResult<ImportSummary> {
        self.run(path, Catalog::Songs).await
    }

    /// Import a product CSV from `path`, upserting by product name
    pub async fn import_products(&self, path: &Path) -> AppResult<ImportSummary> {
        self.run(path, Catalog::Products).await
    }

    async fn run(&self, path: &Path, catalog: Catalog) -> AppResult<ImportSummary> {
        let result = self.ingest(path, &catalog).await;
        // The upload is consumed either way; a leftover temp file is only
        // worth a log line.
        if let Err(e) = std::fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "failed to delete uploaded csv");
        }
        result
    }

    async fn ingest(&self, path: &Path, catalog: &Catalog) -> AppResult<ImportSummary> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path)
            .map_err(|e| AppError::validation(format!("cannot read csv: {}", e)))?;

        let headers = rows::header_map(
            reader
                .headers()
                .map_err(|e| AppError::validation(format!("cannot read csv headers: {}", e)))?,
        );

        let mut imported = 0u64;
        let mut errors = Vec::new();

        for (idx, record) in reader.records().enumerate() {
            let row = idx as u64 + 1;
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    errors.push(ImportRowError {
                        row,
                        message: format!("malformed row: {}", e),
                    });
                    continue;
                }
            };

            let outcome = match catalog {
                Catalog::Songs => match rows::parse_song(&record, &headers) {
                    Ok(song) => self
                        .songs
                        .upsert_by_code(song)
                        .await
                        .map(|_| ())
                        .map_err(|e| e.to_string()),
                    Err(msg) => Err(msg),
                },
                Catalog::Products => match rows::parse_product(&record, &headers) {
                    Ok(product) => self
                        .products
                        .upsert_by_name(product)
                        .await
                        .map(|_| ())
                        .map_err(|e| e.to_string()),
                    Err(msg) => Err(msg),
                },
            };

            match outcome {
                Ok(()) => imported += 1,
                Err(message) => errors.push(ImportRowError { row, message }),
            }
        }

        info!(
            path = %path.display(),
            imported,
            rejected = errors.len(),
            "csv import finished"
        );

        Ok(ImportSummary {
            success: errors.is_empty(),
            imported,
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use std::io::Write;

    async fn service() -> (CsvImportService, SongRepository, ProductRepository) {
        let svc = DbService::memory().await.expect("memory db");
        let songs = SongRepository::new(svc.db.clone());
        let products = ProductRepository::new(svc.db.clone());
        (
            CsvImportService::new(songs.clone(), products.clone()),
            songs,
            products,
        )
    }

    fn csv_file(content: &str) -> std::path::PathBuf {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.keep().join("upload.csv");
        let mut f = std::fs::File::create(&path).expect("create");
        f.write_all(content.as_bytes()).expect("write");
        path
    }

    #[tokio::test]
    async fn good_rows_import_and_file_is_deleted() {
        let (service, songs, _) = service().await;
        let path = csv_file(
            "title,artist,code,genre,language,indexed,popularity\n\
             Bohemian Rhapsody,Queen,1,rock,en,true,95\n\
             Yesterday,The Beatles,2,rock,en,true,90\n",
        );

        let summary = service.import_songs(&path).await.expect("import");
        assert!(summary.success);
        assert_eq!(summary.imported, 2);
        assert!(summary.errors.is_empty());
        assert!(!path.exists());

        assert_eq!(songs.find_all().await.expect("all").len(), 2);
    }

    #[tokio::test]
    async fn bad_rows_are_reported_but_do_not_abort() {
        let (service, songs, _) = service().await;
        let path = csv_file(
            "title,artist,code,genre,language,indexed,popularity\n\
             Bohemian Rhapsody,Queen,1,rock,en,true,95\n\
             No Code,Queen,,rock,en,true,10\n\
             Yesterday,The Beatles,2,rock,en,true,90\n",
        );

        let summary = service.import_songs(&path).await.expect("import");
        assert!(!summary.success);
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].row, 2);

        assert_eq!(songs.find_all().await.expect("all").len(), 2);
    }

    #[tokio::test]
    async fn reimport_updates_instead_of_duplicating() {
        let (service, _, products) = service().await;
        let first = csv_file(
            "nombre,precio,categoria,estado,cantidad,imagenURL\n\
             Agua,1.50,bebidas,disponible,24,\n",
        );
        service.import_products(&first).await.expect("first");

        let second = csv_file(
            "nombre,precio,categoria,estado,cantidad,imagenURL\n\
             Agua,2.00,bebidas,disponible,12,\n",
        );
        let summary = service.import_products(&second).await.expect("second");
        assert!(summary.success);

        let all = products.find_all().await.expect("all");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].price.to_string(), "2.00");
        assert_eq!(all[0].stock, 12);
    }
}
