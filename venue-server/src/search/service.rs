//! Search service
//!
//! In-process scoring over the catalog repositories. Candidates are loaded,
//! scored with [`super::score`], ordered by score (popularity breaks song
//! ties), then windowed into a [`SearchPage`].

use super::score;
use crate::db::models::{Product, Song};
use crate::db::repository::{ProductRepository, SongRepository};
use crate::utils::{AppError, AppResult};
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// One page of results plus the pagination envelope
#[derive(Debug, Serialize)]
pub struct SearchPage<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}

impl<T> SearchPage<T> {
    /// Window `(page, limit)` out of the full scored list. Page numbers are
    /// 1-based; `pages` is zero when nothing matched.
    fn window(mut all: Vec<T>, page: u64, limit: u64) -> Self {
        let total = all.len() as u64;
        let pages = total.div_ceil(limit);
        let skip = (page.saturating_sub(1) * limit) as usize;

        let items = if skip >= all.len() {
            Vec::new()
        } else {
            all.drain(..skip);
            all.truncate(limit as usize);
            all
        };

        Self {
            items,
            total,
            page,
            pages,
        }
    }
}

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`
pub fn clamp_limit(limit: Option<u64>) -> u64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

#[derive(Clone)]
pub struct SearchService {
    songs: SongRepository,
    products: ProductRepository,
}

impl SearchService {
    pub fn new(songs: SongRepository, products: ProductRepository) -> Self {
        Self { songs, products }
    }

    /// Fuzzy search over song title and artist. Ties on score fall back to
    /// popularity.
    pub async fn search_songs(
        &self,
        query: &str,
        page: u64,
        limit: u64,
    ) -> AppResult<SearchPage<Song>> {
        let query_tokens = score::tokenize(query);
        if query_tokens.is_empty() {
            return Err(AppError::validation("search query must not be empty"));
        }

        let mut scored: Vec<(f64, Song)> = self
            .songs
            .find_all()
            .await
            .map_err(AppError::from)?
            .into_iter()
            .filter_map(|song| {
                let title = score::score_text(&query_tokens, &song.title);
                let artist = score::score_text(&query_tokens, &song.artist);
                let best = match (title, artist) {
                    (Some(t), Some(a)) => Some(t.max(a)),
                    (t, a) => t.or(a),
                }?;
                Some((best, song))
            })
            .collect();

        scored.sort_by(|(sa, a), (sb, b)| {
            sb.partial_cmp(sa)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.popularity.cmp(&a.popularity))
        });

        let songs = scored.into_iter().map(|(_, s)| s).collect();
        Ok(SearchPage::window(songs, page, limit))
    }

    /// Fuzzy search over product name and category, restricted to orderable
    /// products.
    pub async fn search_products(
        &self,
        query: &str,
        page: u64,
        limit: u64,
    ) -> AppResult<SearchPage<Product>> {
        let query_tokens = score::tokenize(query);
        if query_tokens.is_empty() {
            return Err(AppError::validation("search query must not be empty"));
        }

        let mut scored: Vec<(f64, Product)> = self
            .products
            .find_available()
            .await
            .map_err(AppError::from)?
            .into_iter()
            .filter_map(|product| {
                let name = score::score_text(&query_tokens, &product.name);
                let category = score::score_text(&query_tokens, &product.category);
                let best = match (name, category) {
                    (Some(n), Some(c)) => Some(n.max(c)),
                    (n, c) => n.or(c),
                }?;
                Some((best, product))
            })
            .collect();

        scored.sort_by(|(sa, a), (sb, b)| {
            sb.partial_cmp(sa)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.name.cmp(&b.name))
        });

        let products = scored.into_iter().map(|(_, p)| p).collect();
        Ok(SearchPage::window(products, page, limit))
    }

    /// Faceted song filter by genre/language membership, popularity order.
    /// The windowing happens in the database; only the envelope is built
    /// here.
    pub async fn filter_songs(
        &self,
        genres: &[String],
        languages: &[String],
        page: u64,
        limit: u64,
    ) -> AppResult<SearchPage<Song>> {
        let skip = page.saturating_sub(1) * limit;
        let (items, total) = self
            .songs
            .filter_page(genres, languages, skip, limit)
            .await
            .map_err(AppError::from)?;

        Ok(SearchPage {
            items,
            total,
            page,
            pages: total.div_ceil(limit),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::STATUS_AVAILABLE;
    use rust_decimal_macros::dec;

    async fn service() -> (SearchService, SongRepository, ProductRepository) {
        let svc = DbService::memory().await.expect("memory db");
        let songs = SongRepository::new(svc.db.clone());
        let products = ProductRepository::new(svc.db.clone());
        (
            SearchService::new(songs.clone(), products.clone()),
            songs,
            products,
        )
    }

    fn song(code: i64, title: &str, artist: &str, popularity: i64, indexed: bool) -> Song {
        Song {
            id: None,
            title: title.to_string(),
            artist: artist.to_string(),
            code,
            genres: vec!["rock".to_string()],
            language: "en".to_string(),
            indexed,
            popularity,
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn typo_still_finds_the_song() {
        let (service, songs, _) = service().await;
        songs
            .create(song(1, "Bohemian Rhapsody", "Queen", 95, true))
            .await
            .unwrap();
        songs
            .create(song(2, "Yesterday", "The Beatles", 90, true))
            .await
            .unwrap();

        let page = service
            .search_songs("bohemain", 1, 20)
            .await
            .expect("search");
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].code, 1);
    }

    #[tokio::test]
    async fn unindexed_songs_are_still_searchable() {
        let (service, songs, _) = service().await;
        songs
            .create(song(1, "Hidden Track", "Nobody", 50, false))
            .await
            .unwrap();

        let page = service.search_songs("hidden", 1, 20).await.expect("search");
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].code, 1);
    }

    #[test]
    fn default_page_size_is_ten() {
        assert_eq!(clamp_limit(None), 10);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(500)), MAX_PAGE_SIZE);
    }

    #[tokio::test]
    async fn pagination_envelope_is_consistent() {
        let (service, songs, _) = service().await;
        for i in 0..5 {
            songs
                .create(song(i, &format!("Dancing {}", i), "Artist", i, true))
                .await
                .unwrap();
        }

        let page1 = service.search_songs("dancing", 1, 2).await.expect("page 1");
        assert_eq!(page1.total, 5);
        assert_eq!(page1.pages, 3);
        assert_eq!(page1.items.len(), 2);

        let page3 = service.search_songs("dancing", 3, 2).await.expect("page 3");
        assert_eq!(page3.items.len(), 1);

        let page9 = service.search_songs("dancing", 9, 2).await.expect("page 9");
        assert!(page9.items.is_empty());
        assert_eq!(page9.total, 5);
    }

    #[tokio::test]
    async fn exact_match_ranks_above_fuzzy() {
        let (service, songs, _) = service().await;
        songs
            .create(song(1, "Dancer", "A", 99, true))
            .await
            .unwrap();
        songs
            .create(song(2, "Dance", "B", 10, true))
            .await
            .unwrap();

        let page = service.search_songs("dance", 1, 20).await.expect("search");
        assert_eq!(page.items[0].code, 2);
    }

    #[tokio::test]
    async fn product_search_skips_unavailable() {
        let (service, _, products) = service().await;
        products
            .create(crate::db::models::Product {
                id: None,
                name: "Mojito".to_string(),
                category: "cocktails".to_string(),
                price: dec!(7.00),
                image_url: None,
                stock: 5,
                status: STATUS_AVAILABLE.to_string(),
                created_at: chrono::Utc::now(),
            })
            .await
            .unwrap();
        products
            .create(crate::db::models::Product {
                id: None,
                name: "Mojito Grande".to_string(),
                category: "cocktails".to_string(),
                price: dec!(9.00),
                image_url: None,
                stock: 0,
                status: "out_of_stock".to_string(),
                created_at: chrono::Utc::now(),
            })
            .await
            .unwrap();

        let page = service
            .search_products("mojito", 1, 20)
            .await
            .expect("search");
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "Mojito");
    }

    #[tokio::test]
    async fn empty_query_is_rejected() {
        let (service, _, _) = service().await;
        let err = service.search_songs("  !! ", 1, 20).await.expect_err("empty");
        assert!(matches!(err, AppError::Validation(_)));
    }
}
