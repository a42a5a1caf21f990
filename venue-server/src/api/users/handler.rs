//! User management handlers

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::{RoleRef, User, UserCreate, UserPublic, UserUpdate};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

/// GET /api/users
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<UserPublic>>>> {
    let users = state.users().find_all().await.map_err(AppError::from)?;
    Ok(ok(users.into_iter().map(UserPublic::from).collect()))
}

/// GET /api/users/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<UserPublic>>> {
    let user = state
        .users()
        .find_by_id(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", id)))?;
    Ok(ok(user.into()))
}

/// POST /api/users
///
/// Unlike self-registration, an administrator may assign any role.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<AppResponse<UserPublic>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let password_hash = User::hash_password(&payload.password)
        .map_err(|e| AppError::internal(format!("password hashing failed: {}", e)))?;

    let user = User {
        id: None,
        name: payload.name,
        username: payload.username,
        email: payload.email,
        password_hash,
        role: payload.role.unwrap_or_else(RoleRef::customer),
        phone: payload.phone,
        address: payload.address,
        created_at: chrono::Utc::now(),
    };

    let created = state.users().create(user).await.map_err(AppError::from)?;
    Ok(ok(created.into()))
}

/// PUT /api/users/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<AppResponse<UserPublic>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let password_hash = match payload.password {
        Some(ref password) => Some(
            User::hash_password(password)
                .map_err(|e| AppError::internal(format!("password hashing failed: {}", e)))?,
        ),
        None => None,
    };

    let updated = state
        .users()
        .update(
            &id,
            payload.name,
            payload.email,
            password_hash,
            payload.role,
            payload.phone,
            payload.address,
        )
        .await
        .map_err(AppError::from)?;
    Ok(ok(updated.into()))
}

/// DELETE /api/users/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<()>>> {
    state.users().delete(&id).await.map_err(AppError::from)?;
    Ok(ok_with_message((), "User deleted"))
}
