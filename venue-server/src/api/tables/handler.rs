//! Venue table handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::core::ServerState;
use crate::db::models::{
    AccumulatedTotal, LineState, OrderLineCreate, PaymentMethod, SongState, TableCreate,
    TableSongCreate, TableSongEntry, TableState, TableUpdate, VenueTable,
};
use crate::db::repository::RepoError;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

#[derive(Debug, Deserialize)]
pub struct SongStateUpdate {
    pub state: SongState,
}

#[derive(Debug, Deserialize)]
pub struct LineStateUpdate {
    pub state: LineState,
}

#[derive(Debug, Deserialize)]
pub struct TableCloseRequest {
    pub method: PaymentMethod,
    pub comment: Option<String>,
}

/// GET /api/tables
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<VenueTable>>>> {
    let tables = state.tables().find_all().await.map_err(AppError::from)?;
    Ok(ok(tables))
}

/// GET /api/tables/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<VenueTable>>> {
    let table = state
        .tables()
        .find_by_id(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Table {} not found", id)))?;
    Ok(ok(table))
}

/// GET /api/tables/by-credential/{credential}
///
/// Guest access path: the table credential stands in for a login.
pub async fn get_by_credential(
    State(state): State<ServerState>,
    Path(credential): Path<String>,
) -> AppResult<Json<AppResponse<VenueTable>>> {
    let table = state
        .tables()
        .find_by_credential(&credential)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("No table for this credential"))?;
    Ok(ok(table))
}

/// POST /api/tables
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TableCreate>,
) -> AppResult<Json<AppResponse<VenueTable>>> {
    if payload.capacity == 0 {
        return Err(AppError::validation("capacity must be at least 1"));
    }

    let table = VenueTable {
        id: None,
        table_number: payload.table_number,
        capacity: payload.capacity,
        special_status: payload.special_status,
        state: payload.state.unwrap_or_else(TableState::available),
        credential: payload
            .credential
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string()),
        songs: Vec::new(),
        order_lines: Vec::new(),
        accumulated_total: AccumulatedTotal::zero(),
        closing: None,
        created_at: chrono::Utc::now(),
        revision: 0,
    };

    let created = state.tables().create(table).await.map_err(AppError::from)?;
    Ok(ok(created))
}

/// PUT /api/tables/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<TableUpdate>,
) -> AppResult<Json<AppResponse<VenueTable>>> {
    if let Some(0) = payload.capacity {
        return Err(AppError::validation("capacity must be at least 1"));
    }
    let updated = state
        .tables()
        .update(&id, payload)
        .await
        .map_err(AppError::from)?;
    Ok(ok(updated))
}

/// DELETE /api/tables/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<()>>> {
    let table = state
        .tables()
        .find_by_id(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Table {} not found", id)))?;
    if !table.order_lines.is_empty() && !table.is_closed() {
        return Err(AppError::business_rule(
            "table has an open account; close it before deleting",
        ));
    }

    state.tables().delete(&id).await.map_err(AppError::from)?;
    Ok(ok_with_message((), "Table deleted"))
}

/// POST /api/tables/{id}/order-lines
pub async fn add_order_line(
    State(state): State<ServerState>,
    current: crate::auth::CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<OrderLineCreate>,
) -> AppResult<Json<AppResponse<VenueTable>>> {
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;
    let updated = state
        .billing()
        .append_order_line(&id, payload, &current)
        .await?;
    Ok(ok(updated))
}

/// PUT /api/tables/{id}/order-lines/{index}/state
pub async fn set_line_state(
    State(state): State<ServerState>,
    Path((id, index)): Path<(String, usize)>,
    Json(payload): Json<LineStateUpdate>,
) -> AppResult<Json<AppResponse<VenueTable>>> {
    let updated = state
        .billing()
        .set_line_state(&id, index, payload.state)
        .await?;
    Ok(ok(updated))
}

/// POST /api/tables/{id}/songs
///
/// Queues a song on the table. The title is snapshotted from the catalog so
/// later catalog edits do not rewrite the queue history.
pub async fn add_song(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<TableSongCreate>,
) -> AppResult<Json<AppResponse<VenueTable>>> {
    let song = state
        .songs()
        .find_by_id(&payload.song)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Song {} not found", payload.song)))?;

    let entry = TableSongEntry {
        title: song.title,
        state: SongState::queued(),
        registered_at: chrono::Utc::now(),
        special: payload.special,
    };

    let updated = state
        .tables()
        .mutate(&id, |table| {
            if table.is_closed() {
                return Err(RepoError::Validation(
                    "account is closed; reset the table first".to_string(),
                ));
            }
            table.songs.push(entry.clone());
            Ok(())
        })
        .await
        .map_err(AppError::from)?;
    Ok(ok(updated))
}

/// PUT /api/tables/{id}/songs/{index}/state
pub async fn set_song_state(
    State(state): State<ServerState>,
    Path((id, index)): Path<(String, usize)>,
    Json(payload): Json<SongStateUpdate>,
) -> AppResult<Json<AppResponse<VenueTable>>> {
    let updated = state
        .tables()
        .mutate(&id, |table| {
            let entry = table
                .songs
                .get_mut(index)
                .ok_or_else(|| RepoError::NotFound(format!("song entry {} not found", index)))?;
            entry.state = payload.state.clone();
            Ok(())
        })
        .await
        .map_err(AppError::from)?;
    Ok(ok(updated))
}

/// POST /api/tables/{id}/close
pub async fn close_account(
    State(state): State<ServerState>,
    current: crate::auth::CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<TableCloseRequest>,
) -> AppResult<Json<AppResponse<VenueTable>>> {
    validate_optional_text(&payload.comment, "comment", MAX_NOTE_LEN)?;
    let (table, _record) = state
        .billing()
        .close_table(&id, payload.method, payload.comment, &current)
        .await?;
    Ok(ok_with_message(table, "Account closed"))
}

/// POST /api/tables/{id}/reset
pub async fn reset(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<VenueTable>>> {
    let table = state.billing().reset_table(&id).await?;
    Ok(ok_with_message(table, "Table reset"))
}
