//! Song catalog handlers

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::models::{Song, SongCreate, SongUpdate};
use crate::import::ImportSummary;
use crate::search::{SearchPage, clamp_limit};
use crate::utils::validation::{MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_required_text};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct FilterQuery {
    /// Comma-separated genre list
    pub genres: Option<String>,
    /// Comma-separated language list
    pub languages: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

fn split_csv_param(raw: &Option<String>) -> Vec<String> {
    raw.as_deref()
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// GET /api/songs
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<Song>>>> {
    let songs = state.songs().find_all().await.map_err(AppError::from)?;
    Ok(ok(songs))
}

/// GET /api/songs/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Song>>> {
    let song = state
        .songs()
        .find_by_id(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Song {} not found", id)))?;
    Ok(ok(song))
}

/// GET /api/songs/search?q=...&page=1&limit=20
pub async fn search(
    State(state): State<ServerState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<AppResponse<SearchPage<Song>>>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = clamp_limit(query.limit);
    let result = state.search().search_songs(&query.q, page, limit).await?;
    Ok(ok(result))
}

/// GET /api/songs/filter?genres=rock,salsa&languages=es&page=1&limit=20
pub async fn filter(
    State(state): State<ServerState>,
    Query(query): Query<FilterQuery>,
) -> AppResult<Json<AppResponse<SearchPage<Song>>>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = clamp_limit(query.limit);
    let genres = split_csv_param(&query.genres);
    let languages = split_csv_param(&query.languages);

    let result = state
        .search()
        .filter_songs(&genres, &languages, page, limit)
        .await?;
    Ok(ok(result))
}

/// POST /api/songs
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<SongCreate>,
) -> AppResult<Json<AppResponse<Song>>> {
    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_required_text(&payload.artist, "artist", MAX_NAME_LEN)?;
    validate_required_text(&payload.language, "language", MAX_SHORT_TEXT_LEN)?;

    let song = Song {
        id: None,
        title: payload.title,
        artist: payload.artist,
        code: payload.code,
        genres: payload.genres,
        language: payload.language,
        indexed: payload.indexed.unwrap_or(true),
        popularity: Song::clamp_popularity(payload.popularity.unwrap_or(0)),
        created_at: chrono::Utc::now(),
    };

    let created = state.songs().create(song).await.map_err(AppError::from)?;
    Ok(ok(created))
}

/// PUT /api/songs/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<SongUpdate>,
) -> AppResult<Json<AppResponse<Song>>> {
    let updated = state
        .songs()
        .update(&id, payload)
        .await
        .map_err(AppError::from)?;
    Ok(ok(updated))
}

/// DELETE /api/songs/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<()>>> {
    state.songs().delete(&id).await.map_err(AppError::from)?;
    Ok(ok_with_message((), "Song deleted"))
}

/// POST /api/songs/import (multipart, field "file")
pub async fn import(
    State(state): State<ServerState>,
    multipart: Multipart,
) -> AppResult<Json<AppResponse<ImportSummary>>> {
    let path = crate::api::stage_csv_upload(&state, multipart).await?;
    let summary = state.importer().import_songs(&path).await?;
    Ok(ok(summary))
}
