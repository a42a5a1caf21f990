//! Venue Table Repository
//!
//! Tables carry embedded song queues and order lines, so most mutations are
//! load-mutate-save. `save` is a conditional write on the revision counter;
//! a lost race surfaces as [`RepoError::Conflict`] and the caller retries
//! from a fresh read.

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{TableUpdate, VenueTable};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "venue_table";

#[derive(Clone)]
pub struct TableRepository {
    base: BaseRepository,
}

impl TableRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All tables ordered by table number
    pub async fn find_all(&self) -> RepoResult<Vec<VenueTable>> {
        let tables: Vec<VenueTable> = self
            .base
            .db()
            .query("SELECT * FROM venue_table ORDER BY table_number")
            .await?
            .take(0)?;
        Ok(tables)
    }

    /// Find table by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<VenueTable>> {
        let rid = parse_id(TABLE, id)?;
        let table: Option<VenueTable> = self.base.db().select(rid).await?;
        Ok(table)
    }

    /// Find table by its unique number
    pub async fn find_by_number(&self, number: u32) -> RepoResult<Option<VenueTable>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM venue_table WHERE table_number = $number LIMIT 1")
            .bind(("number", number))
            .await?;
        let tables: Vec<VenueTable> = result.take(0)?;
        Ok(tables.into_iter().next())
    }

    /// Find table by its guest credential
    pub async fn find_by_credential(&self, credential: &str) -> RepoResult<Option<VenueTable>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM venue_table WHERE credential = $credential LIMIT 1")
            .bind(("credential", credential.to_string()))
            .await?;
        let tables: Vec<VenueTable> = result.take(0)?;
        Ok(tables.into_iter().next())
    }

    /// Create a new table
    pub async fn create(&self, table: VenueTable) -> RepoResult<VenueTable> {
        if self.find_by_number(table.table_number).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "table number {} already exists",
                table.table_number
            )));
        }
        if self.find_by_credential(&table.credential).await?.is_some() {
            return Err(RepoError::Duplicate(
                "table credential already in use".to_string(),
            ));
        }

        let created: Option<VenueTable> = self.base.db().create(TABLE).content(table).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create table".to_string()))
    }

    /// Conditional full-document write. The caller passes the table as
    /// loaded; the write only lands if the stored revision still matches,
    /// and the stored revision is bumped by one.
    pub async fn save(&self, table: VenueTable) -> RepoResult<VenueTable> {
        let rid = table
            .id
            .clone()
            .ok_or_else(|| RepoError::Validation("table has no id".to_string()))?;
        let expected = table.revision;

        let mut content = table;
        content.id = None;
        content.revision = expected + 1;

        let updated: Option<VenueTable> = self
            .base
            .db()
            .query("UPDATE $id CONTENT $data WHERE revision = $expected RETURN AFTER")
            .bind(("id", rid.clone()))
            .bind(("data", content))
            .bind(("expected", expected))
            .await?
            .take(0)?;

        updated.ok_or_else(|| {
            RepoError::Conflict(format!("table {} was modified concurrently", rid))
        })
    }

    /// Load-mutate-save with retry. The closure is re-applied against a
    /// fresh read whenever the conditional write loses a race; after a few
    /// lost races the conflict is surfaced to the caller.
    pub async fn mutate<F>(&self, id: &str, f: F) -> RepoResult<VenueTable>
    where
        F: Fn(&mut VenueTable) -> RepoResult<()>,
    {
        const MAX_ATTEMPTS: u32 = 3;
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut table = self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Table {} not found", id)))?;
            f(&mut table)?;
            match self.save(table).await {
                Ok(saved) => return Ok(saved),
                Err(RepoError::Conflict(_)) if attempt < MAX_ATTEMPTS => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Partial update of the table's own attributes (not its embedded lists)
    pub async fn update(&self, id: &str, data: TableUpdate) -> RepoResult<VenueTable> {
        let rid = parse_id(TABLE, id)?;

        if let Some(ref credential) = data.credential
            && let Some(existing) = self.find_by_credential(credential).await?
            && existing.id.as_ref() != Some(&rid)
        {
            return Err(RepoError::Duplicate(
                "table credential already in use".to_string(),
            ));
        }

        let mut set_parts: Vec<&str> = Vec::new();
        if data.capacity.is_some() {
            set_parts.push("capacity = $capacity");
        }
        if data.special_status.is_some() {
            set_parts.push("special_status = $special_status");
        }
        if data.state.is_some() {
            set_parts.push("state = $state");
        }
        if data.credential.is_some() {
            set_parts.push("credential = $credential");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Table {} not found", id)));
        }
        set_parts.push("revision = revision + 1");

        let query_str = format!("UPDATE $id SET {} RETURN AFTER", set_parts.join(", "));
        let mut query = self.base.db().query(query_str).bind(("id", rid));

        if let Some(v) = data.capacity {
            query = query.bind(("capacity", v));
        }
        if let Some(v) = data.special_status {
            query = query.bind(("special_status", v));
        }
        if let Some(v) = data.state {
            query = query.bind(("state", v));
        }
        if let Some(v) = data.credential {
            query = query.bind(("credential", v));
        }

        let mut result = query.await?;
        let tables: Vec<VenueTable> = result.take(0)?;
        tables
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Table {} not found", id)))
    }

    /// Hard delete a table
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let rid = parse_id(TABLE, id)?;
        let deleted: Option<VenueTable> = self.base.db().delete(rid).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Table {} not found", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::{AccumulatedTotal, TableState};

    async fn repo() -> TableRepository {
        let svc = DbService::memory().await.expect("memory db");
        TableRepository::new(svc.db)
    }

    fn table(number: u32, credential: &str) -> VenueTable {
        VenueTable {
            id: None,
            table_number: number,
            capacity: 4,
            special_status: false,
            state: TableState::available(),
            credential: credential.to_string(),
            songs: Vec::new(),
            order_lines: Vec::new(),
            accumulated_total: AccumulatedTotal::zero(),
            closing: None,
            created_at: chrono::Utc::now(),
            revision: 0,
        }
    }

    #[tokio::test]
    async fn create_and_find_by_credential() {
        let repo = repo().await;
        repo.create(table(1, "cred-1")).await.expect("create");

        let found = repo
            .find_by_credential("cred-1")
            .await
            .expect("query")
            .expect("present");
        assert_eq!(found.table_number, 1);
    }

    #[tokio::test]
    async fn duplicate_number_is_rejected() {
        let repo = repo().await;
        repo.create(table(1, "cred-1")).await.expect("create");
        let err = repo.create(table(1, "cred-2")).await.expect_err("dup");
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn save_detects_concurrent_modification() {
        let repo = repo().await;
        let created = repo.create(table(1, "cred-1")).await.expect("create");

        // Two readers load the same revision
        let copy_a = created.clone();
        let mut copy_b = created;

        let saved = repo.save(copy_a).await.expect("first save");
        assert_eq!(saved.revision, 1);

        copy_b.capacity = 8;
        let err = repo.save(copy_b).await.expect_err("stale save");
        assert!(matches!(err, RepoError::Conflict(_)));
    }
}
