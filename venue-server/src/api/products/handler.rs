//! Product catalog handlers

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductUpdate, STATUS_AVAILABLE};
use crate::import::ImportSummary;
use crate::search::{SearchPage, clamp_limit};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_URL_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// GET /api/products
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<Product>>>> {
    let products = state.products().find_all().await.map_err(AppError::from)?;
    Ok(ok(products))
}

/// GET /api/products/available
pub async fn list_available(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<Vec<Product>>>> {
    let products = state
        .products()
        .find_available()
        .await
        .map_err(AppError::from)?;
    Ok(ok(products))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Product>>> {
    let product = state
        .products()
        .find_by_id(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", id)))?;
    Ok(ok(product))
}

/// GET /api/products/search?q=...&page=1&limit=20
pub async fn search(
    State(state): State<ServerState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<AppResponse<SearchPage<Product>>>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = clamp_limit(query.limit);
    let result = state
        .search()
        .search_products(&query.q, page, limit)
        .await?;
    Ok(ok(result))
}

/// POST /api/products
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<AppResponse<Product>>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.category, "category", MAX_NAME_LEN)?;
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;

    let product = Product {
        id: None,
        name: payload.name,
        category: payload.category,
        price: payload.price,
        image_url: payload.image_url,
        stock: payload.stock.unwrap_or(0),
        status: payload
            .status
            .unwrap_or_else(|| STATUS_AVAILABLE.to_string()),
        created_at: chrono::Utc::now(),
    };

    let created = state
        .products()
        .create(product)
        .await
        .map_err(AppError::from)?;
    Ok(ok(created))
}

/// PUT /api/products/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<AppResponse<Product>>> {
    let updated = state
        .products()
        .update(&id, payload)
        .await
        .map_err(AppError::from)?;
    Ok(ok(updated))
}

/// DELETE /api/products/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<()>>> {
    state.products().delete(&id).await.map_err(AppError::from)?;
    Ok(ok_with_message((), "Product deleted"))
}

/// POST /api/products/import (multipart, field "file")
pub async fn import(
    State(state): State<ServerState>,
    multipart: Multipart,
) -> AppResult<Json<AppResponse<ImportSummary>>> {
    let path = crate::api::stage_csv_upload(&state, multipart).await?;
    let summary = state.importer().import_products(&path).await?;
    Ok(ok(summary))
}
