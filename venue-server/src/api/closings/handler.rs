//! Closing history handlers
//!
//! Settlements write records through the billing service; this API reads
//! the trail and accepts the manual till-closing entry staff record at the
//! end of a shift. There is no update or delete surface.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{ClosedBy, ClosingCreate, ClosingRecord};
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// GET /api/closings
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<Vec<ClosingRecord>>>> {
    let records = state.closings().find_all().await.map_err(AppError::from)?;
    Ok(ok(records))
}

/// GET /api/closings/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<ClosingRecord>>> {
    let record = state
        .closings()
        .find_by_id(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Closing record {} not found", id)))?;
    Ok(ok(record))
}

/// POST /api/closings
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<ClosingCreate>,
) -> AppResult<Json<AppResponse<ClosingRecord>>> {
    if payload.grand_total < rust_decimal::Decimal::ZERO {
        return Err(AppError::validation("grand total must not be negative"));
    }

    let record = state
        .closings()
        .create(ClosingRecord {
            id: None,
            closed_at: chrono::Utc::now(),
            grand_total: payload.grand_total,
            comment: payload.comment,
            user: ClosedBy {
                user_id: current.id.clone(),
                user_name: current.username.clone(),
            },
        })
        .await
        .map_err(AppError::from)?;
    Ok(ok(record))
}
