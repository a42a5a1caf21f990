//! Authentication handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{RoleRef, User, UserCreate, UserPublic};
use crate::security_log;
use crate::utils::{AppError, AppResponse, AppResult, ok};

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserPublic,
}

/// POST /api/auth/register
///
/// Self-registration always lands on the customer role; staff and admin
/// accounts are created through the admin-gated user API.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<AppResponse<AuthResponse>>> {
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
        role: RoleRef::customer(),
        phone: payload.phone,
        address: payload.address,
        created_at: chrono::Utc::now(),
    };

    let created = state.users().create(user).await.map_err(AppError::from)?;
    let token = issue_token(&state, &created)?;

    security_log!(
        "INFO",
        "user_registered",
        username = created.username.clone()
    );
    Ok(ok(AuthResponse {
        token,
        user: created.into(),
    }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AppResponse<AuthResponse>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let user = state
        .users()
        .find_by_username(&payload.username)
        .await
        .map_err(AppError::from)?;

    let Some(user) = user else {
        // Burn comparable time for unknown usernames so the response
        // timing does not reveal which usernames exist.
        let _ = User::hash_password(&payload.password);
        security_log!("WARN", "login_unknown_user", username = payload.username);
        return Err(AppError::invalid_credentials());
    };

    let verified = user
        .verify_password(&payload.password)
        .map_err(|e| AppError::internal(format!("password verification failed: {}", e)))?;
    if !verified {
        security_log!("WARN", "login_bad_password", username = payload.username);
        return Err(AppError::invalid_credentials());
    }

    let token = issue_token(&state, &user)?;
    security_log!("INFO", "login_ok", username = user.username.clone());

    Ok(ok(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<AppResponse<UserPublic>>> {
    let user = state
        .users()
        .find_by_id(&current.id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("User no longer exists"))?;

    Ok(ok(user.into()))
}

fn issue_token(state: &ServerState, user: &User) -> AppResult<String> {
    let id = user
        .id
        .as_ref()
        .map(|id| id.to_string())
        .ok_or_else(|| AppError::internal("stored user has no id"))?;

    state
        .get_jwt_service()
        .generate_token(&id, &user.username, user.role.role_id, &user.role.role_name)
        .map_err(|e| AppError::internal(format!("token generation failed: {}", e)))
}
