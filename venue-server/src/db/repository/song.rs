//! Song Repository

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{Song, SongUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "song";

#[derive(Clone)]
pub struct SongRepository {
    base: BaseRepository,
}

#[derive(serde::Deserialize)]
struct CountRow {
    total: u64,
}

impl SongRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All songs, catalog order (title, artist)
    pub async fn find_all(&self) -> RepoResult<Vec<Song>> {
        let songs: Vec<Song> = self
            .base
            .db()
            .query("SELECT * FROM song ORDER BY title, artist")
            .await?
            .take(0)?;
        Ok(songs)
    }

    /// Find song by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Song>> {
        let rid = parse_id(TABLE, id)?;
        let song: Option<Song> = self.base.db().select(rid).await?;
        Ok(song)
    }

    /// Find song by its unique catalog code
    pub async fn find_by_code(&self, code: i64) -> RepoResult<Option<Song>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM song WHERE code = $code LIMIT 1")
            .bind(("code", code))
            .await?;
        let songs: Vec<Song> = result.take(0)?;
        Ok(songs.into_iter().next())
    }

    /// Create a new song
    pub async fn create(&self, song: Song) -> RepoResult<Song> {
        if song.genres.is_empty() {
            return Err(RepoError::Validation(
                "at least one genre is required".into(),
            ));
        }
        if self.find_by_code(song.code).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "song code {} already exists",
                song.code
            )));
        }

        let created: Option<Song> = self.base.db().create(TABLE).content(song).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create song".to_string()))
    }

    /// Upsert keyed by `code`: create-if-absent, overwrite-if-present.
    /// Within one import batch the last row for a code wins.
    pub async fn upsert_by_code(&self, song: Song) -> RepoResult<Song> {
        match self.find_by_code(song.code).await? {
            Some(existing) => {
                let rid = existing
                    .id
                    .ok_or_else(|| RepoError::Database("stored song has no id".into()))?;
                let mut content = song;
                content.id = None;
                let updated: Option<Song> = self
                    .base
                    .db()
                    .query("UPDATE $id CONTENT $data RETURN AFTER")
                    .bind(("id", rid))
                    .bind(("data", content))
                    .await?
                    .take(0)?;
                updated.ok_or_else(|| RepoError::Database("Failed to upsert song".to_string()))
            }
            None => {
                let created: Option<Song> = self.base.db().create(TABLE).content(song).await?;
                created.ok_or_else(|| RepoError::Database("Failed to upsert song".to_string()))
            }
        }
    }

    /// Partial update
    pub async fn update(&self, id: &str, data: SongUpdate) -> RepoResult<Song> {
        let rid = parse_id(TABLE, id)?;

        let mut set_parts: Vec<&str> = Vec::new();
        if data.title.is_some() {
            set_parts.push("title = $title");
        }
        if data.artist.is_some() {
            set_parts.push("artist = $artist");
        }
        if data.genres.is_some() {
            set_parts.push("genres = $genres");
        }
        if data.language.is_some() {
            set_parts.push("language = $language");
        }
        if data.indexed.is_some() {
            set_parts.push("indexed = $indexed");
        }
        if data.popularity.is_some() {
            set_parts.push("popularity = $popularity");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Song {} not found", id)));
        }

        if let Some(ref genres) = data.genres
            && genres.is_empty()
        {
            return Err(RepoError::Validation(
                "at least one genre is required".into(),
            ));
        }

        let query_str = format!("UPDATE $id SET {} RETURN AFTER", set_parts.join(", "));
        let mut query = self.base.db().query(query_str).bind(("id", rid));

        if let Some(v) = data.title {
            query = query.bind(("title", v));
        }
        if let Some(v) = data.artist {
            query = query.bind(("artist", v));
        }
        if let Some(v) = data.genres {
            query = query.bind(("genres", v));
        }
        if let Some(v) = data.language {
            query = query.bind(("language", v));
        }
        if let Some(v) = data.indexed {
            query = query.bind(("indexed", v));
        }
        if let Some(v) = data.popularity {
            query = query.bind(("popularity", Song::clamp_popularity(v)));
        }

        let mut result = query.await?;
        let songs: Vec<Song> = result.take(0)?;
        songs
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Song {} not found", id)))
    }

    /// Hard delete a song
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let rid = parse_id(TABLE, id)?;
        let deleted: Option<Song> = self.base.db().delete(rid).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Song {} not found", id)));
        }
        Ok(())
    }

    /// Exact-membership filter over genres/languages, sorted by popularity
    /// descending, windowed by `(skip, limit)`. Returns the page and the
    /// total match count. Empty filter sets match everything.
    pub async fn filter_page(
        &self,
        genres: &[String],
        languages: &[String],
        skip: u64,
        limit: u64,
    ) -> RepoResult<(Vec<Song>, u64)> {
        let mut conditions: Vec<&str> = Vec::new();
        if !genres.is_empty() {
            conditions.push("genres CONTAINSANY $genres");
        }
        if !languages.is_empty() {
            conditions.push("language INSIDE $languages");
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let page_query = format!(
            "SELECT * FROM song{} ORDER BY popularity DESC LIMIT $limit START $skip",
            where_clause
        );
        let count_query = format!(
            "SELECT count() AS total FROM song{} GROUP ALL",
            where_clause
        );

        let mut query = self
            .base
            .db()
            .query(page_query)
            .query(count_query)
            .bind(("limit", limit))
            .bind(("skip", skip));
        if !genres.is_empty() {
            query = query.bind(("genres", genres.to_vec()));
        }
        if !languages.is_empty() {
            query = query.bind(("languages", languages.to_vec()));
        }

        let mut result = query.await?;
        let songs: Vec<Song> = result.take(0)?;
        let counts: Vec<CountRow> = result.take(1)?;
        let total = counts.first().map(|c| c.total).unwrap_or(0);

        Ok((songs, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn repo() -> SongRepository {
        let svc = DbService::memory().await.expect("memory db");
        SongRepository::new(svc.db)
    }

    fn song(code: i64, title: &str, genres: &[&str], language: &str, popularity: i64) -> Song {
        Song {
            id: None,
            title: title.to_string(),
            artist: "Test Artist".to_string(),
            code,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            language: language.to_string(),
            indexed: true,
            popularity,
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn upsert_by_code_last_writer_wins() {
        let repo = repo().await;
        repo.upsert_by_code(song(100, "Bésame", &["bolero"], "es", 10))
            .await
            .expect("first upsert");
        repo.upsert_by_code(song(100, "Bésame Mucho", &["bolero"], "es", 90))
            .await
            .expect("second upsert");

        let stored = repo
            .find_by_code(100)
            .await
            .expect("query")
            .expect("present");
        assert_eq!(stored.title, "Bésame Mucho");
        assert_eq!(stored.popularity, 90);

        // Still a single record for the code
        let all = repo.find_all().await.expect("all");
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn filter_page_applies_both_dimensions() {
        let repo = repo().await;
        repo.create(song(1, "A", &["rock"], "en", 50)).await.unwrap();
        repo.create(song(2, "B", &["rock"], "es", 80)).await.unwrap();
        repo.create(song(3, "C", &["salsa"], "es", 70)).await.unwrap();

        let (page, total) = repo
            .filter_page(&["rock".to_string()], &["es".to_string()], 0, 10)
            .await
            .expect("filter");
        assert_eq!(total, 1);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].code, 2);
    }

    #[tokio::test]
    async fn empty_filter_matches_everything_sorted_by_popularity() {
        let repo = repo().await;
        repo.create(song(1, "A", &["rock"], "en", 50)).await.unwrap();
        repo.create(song(2, "B", &["rock"], "es", 80)).await.unwrap();

        let (page, total) = repo.filter_page(&[], &[], 0, 10).await.expect("filter");
        assert_eq!(total, 2);
        assert_eq!(page[0].code, 2);
        assert_eq!(page[1].code, 1);
    }
}
