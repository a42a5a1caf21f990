//! Health check handler

use axum::Json;
use serde_json::{Value, json};

use crate::utils::{AppResponse, ok};

/// GET /api/health
pub async fn health() -> Json<AppResponse<Value>> {
    ok(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
