//! API routing
//!
//! One module per resource, each exporting a `router()` nested under its
//! `/api/...` prefix. [`create_router`] assembles them and applies the
//! global layers: authentication, request tracing, CORS.

pub mod auth;
pub mod closings;
pub mod health;
pub mod orders;
pub mod products;
pub mod songs;
pub mod tables;
pub mod users;

use axum::{Router, extract::Multipart, middleware};
use std::path::PathBuf;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// Stage a multipart CSV upload under `work_dir/uploads` and return its
/// path. The import service deletes the file once the batch finishes.
pub(crate) async fn stage_csv_upload(
    state: &ServerState,
    mut multipart: Multipart,
) -> AppResult<PathBuf> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let data = field.bytes().await?;
        if data.is_empty() {
            return Err(AppError::validation("uploaded file is empty"));
        }

        let dir = state.config.upload_dir();
        std::fs::create_dir_all(&dir)
            .map_err(|e| AppError::internal(format!("cannot create upload dir: {}", e)))?;
        let path = dir.join(format!("{}.csv", uuid::Uuid::new_v4().simple()));
        std::fs::write(&path, &data)
            .map_err(|e| AppError::internal(format!("cannot stage upload: {}", e)))?;
        return Ok(path);
    }

    Err(AppError::validation("multipart field 'file' is required"))
}

pub fn create_router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(users::router())
        .merge(tables::router())
        .merge(orders::router())
        .merge(songs::router())
        .merge(products::router())
        .merge(closings::router())
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
