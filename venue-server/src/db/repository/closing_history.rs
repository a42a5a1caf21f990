//! Closing History Repository
//!
//! Closing records are append-only. There is no update or delete path; a
//! wrong closing is corrected by a compensating entry, never by editing.

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::ClosingRecord;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "closing_history";

#[derive(Clone)]
pub struct ClosingHistoryRepository {
    base: BaseRepository,
}

impl ClosingHistoryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All closing records, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<ClosingRecord>> {
        let records: Vec<ClosingRecord> = self
            .base
            .db()
            .query("SELECT * FROM closing_history ORDER BY closed_at DESC")
            .await?
            .take(0)?;
        Ok(records)
    }

    /// Find closing record by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<ClosingRecord>> {
        let rid = parse_id(TABLE, id)?;
        let record: Option<ClosingRecord> = self.base.db().select(rid).await?;
        Ok(record)
    }

    /// Append a closing record
    pub async fn create(&self, record: ClosingRecord) -> RepoResult<ClosingRecord> {
        let created: Option<ClosingRecord> =
            self.base.db().create(TABLE).content(record).await?;
        created.ok_or_else(|| RepoError::Database("Failed to record closing".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::ClosedBy;
    use rust_decimal_macros::dec;

    async fn repo() -> ClosingHistoryRepository {
        let svc = DbService::memory().await.expect("memory db");
        ClosingHistoryRepository::new(svc.db)
    }

    #[tokio::test]
    async fn records_come_back_newest_first() {
        let repo = repo().await;
        let base = chrono::Utc::now();

        for (i, total) in [dec!(10.00), dec!(20.00)].into_iter().enumerate() {
            repo.create(ClosingRecord {
                id: None,
                closed_at: base + chrono::Duration::seconds(i as i64),
                grand_total: total,
                comment: None,
                user: ClosedBy {
                    user_id: "user:u1".to_string(),
                    user_name: "Maria".to_string(),
                },
            })
            .await
            .expect("create");
        }

        let all = repo.find_all().await.expect("all");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].grand_total, dec!(20.00));
        assert_eq!(all[1].grand_total, dec!(10.00));
    }
}
