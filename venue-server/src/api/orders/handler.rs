//! Order handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    Order, OrderCloseRequest, OrderCreate, OrderItem, OrderItemCreate, OrderItemsUpdate,
    OrderStatus, OrderStatusUpdate, SongRequest, SongRequestCreate, SongRequestStatus,
    SongRequestStatusUpdate,
};
use crate::db::repository::parse_id;
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
}

/// Resolve item payloads into stored item lines, snapshotting the current
/// catalog price wherever the payload does not pin one.
async fn resolve_items(
    state: &ServerState,
    items: Vec<OrderItemCreate>,
) -> AppResult<Vec<OrderItem>> {
    let mut resolved = Vec::with_capacity(items.len());
    for item in items {
        let product = state
            .products()
            .find_by_id(&item.product)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::not_found(format!("Product {} not found", item.product)))?;
        if !product.is_available() {
            return Err(AppError::business_rule(format!(
                "product '{}' is not available",
                product.name
            )));
        }

        let product_id = product
            .id
            .ok_or_else(|| AppError::internal("stored product has no id"))?;
        resolved.push(OrderItem {
            product: product_id,
            quantity: item.quantity,
            price: item.price.unwrap_or(product.price),
        });
    }
    Ok(resolved)
}

fn resolve_song_request(song: &str) -> AppResult<SongRequest> {
    let song_id = parse_id("song", song).map_err(AppError::from)?;
    Ok(SongRequest {
        song: song_id,
        status: SongRequestStatus::Pending,
        requested_at: chrono::Utc::now(),
        played_at: None,
    })
}

/// GET /api/orders?status=pending
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<AppResponse<Vec<Order>>>> {
    let orders = match query.status {
        Some(status) => state.orders().find_by_status(status).await,
        None => state.orders().find_all().await,
    }
    .map_err(AppError::from)?;
    Ok(ok(orders))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = state
        .orders()
        .find_by_id(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;
    Ok(ok(order))
}

/// GET /api/orders/by-table/{table_id}
pub async fn list_by_table(
    State(state): State<ServerState>,
    Path(table_id): Path<String>,
) -> AppResult<Json<AppResponse<Vec<Order>>>> {
    let orders = state
        .orders()
        .find_by_table(&table_id)
        .await
        .map_err(AppError::from)?;
    Ok(ok(orders))
}

/// POST /api/orders
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<AppResponse<Order>>> {
    let table_id = parse_id("venue_table", &payload.table).map_err(AppError::from)?;
    state
        .tables()
        .find_by_id(&payload.table)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Table {} not found", payload.table)))?;
    let served_by = parse_id("user", &current.id).map_err(AppError::from)?;

    let items = resolve_items(&state, payload.items).await?;
    let song_requests = payload
        .song_requests
        .iter()
        .map(|r| resolve_song_request(&r.song))
        .collect::<AppResult<Vec<_>>>()?;

    let order = Order {
        id: None,
        table: table_id,
        served_by,
        items,
        song_requests,
        status: OrderStatus::Pending,
        total: rust_decimal::Decimal::ZERO,
        start_time: chrono::Utc::now(),
        end_time: None,
        payment: None,
        revision: 0,
    };

    let created = state.orders().create(order).await.map_err(AppError::from)?;
    Ok(ok(created))
}

/// PUT /api/orders/{id}/items
///
/// Replaces the item lines wholesale; the stored total follows from the
/// recompute-on-persist rule.
pub async fn replace_items(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<OrderItemsUpdate>,
) -> AppResult<Json<AppResponse<Order>>> {
    let mut order = state
        .orders()
        .find_by_id(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;
    if order.is_paid() {
        return Err(AppError::business_rule("order is already paid"));
    }

    order.items = resolve_items(&state, payload.items).await?;
    let saved = state.orders().save(order).await.map_err(AppError::from)?;
    Ok(ok(saved))
}

/// PUT /api/orders/{id}/status
pub async fn set_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<AppResponse<Order>>> {
    let mut order = state
        .orders()
        .find_by_id(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;
    if order.is_paid() && payload.status != OrderStatus::Completed {
        return Err(AppError::business_rule("paid orders cannot be reopened"));
    }

    order.status = payload.status;
    if payload.status == OrderStatus::Cancelled || payload.status == OrderStatus::Completed {
        order.end_time.get_or_insert_with(chrono::Utc::now);
    }
    let saved = state.orders().save(order).await.map_err(AppError::from)?;
    Ok(ok(saved))
}

/// POST /api/orders/{id}/song-requests
pub async fn add_song_request(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<SongRequestCreate>,
) -> AppResult<Json<AppResponse<Order>>> {
    state
        .songs()
        .find_by_id(&payload.song)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Song {} not found", payload.song)))?;

    let mut order = state
        .orders()
        .find_by_id(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;
    if order.is_paid() {
        return Err(AppError::business_rule("order is already paid"));
    }

    order.song_requests.push(resolve_song_request(&payload.song)?);
    let saved = state.orders().save(order).await.map_err(AppError::from)?;
    Ok(ok(saved))
}

/// PUT /api/orders/{id}/song-requests/{index}/status
pub async fn set_song_request_status(
    State(state): State<ServerState>,
    Path((id, index)): Path<(String, usize)>,
    Json(payload): Json<SongRequestStatusUpdate>,
) -> AppResult<Json<AppResponse<Order>>> {
    let mut order = state
        .orders()
        .find_by_id(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;

    let request = order
        .song_requests
        .get_mut(index)
        .ok_or_else(|| AppError::not_found(format!("Song request {} not found", index)))?;
    request.status = payload.status;
    if payload.status == SongRequestStatus::Played {
        request.played_at.get_or_insert_with(chrono::Utc::now);
    }

    let saved = state.orders().save(order).await.map_err(AppError::from)?;
    Ok(ok(saved))
}

/// POST /api/orders/{id}/close
pub async fn close(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<OrderCloseRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let (order, _record) = state.billing().close_order(&id, payload, &current).await?;
    Ok(ok_with_message(order, "Order closed"))
}

/// DELETE /api/orders/{id}
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<()>>> {
    if !current.is_admin() {
        return Err(AppError::forbidden("Administrator role required"));
    }

    let order = state
        .orders()
        .find_by_id(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;
    if order.is_paid() {
        return Err(AppError::business_rule(
            "paid orders are part of the closing audit trail and cannot be deleted",
        ));
    }

    state.orders().delete(&id).await.map_err(AppError::from)?;
    Ok(ok_with_message((), "Order deleted"))
}
