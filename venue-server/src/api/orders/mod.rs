//! Order API (staff only)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_role;
use crate::auth::roles::ROLE_STAFF;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", order_routes())
}

fn order_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete))
        .route("/by-table/{table_id}", get(handler::list_by_table))
        .route("/{id}/items", put(handler::replace_items))
        .route("/{id}/status", put(handler::set_status))
        .route("/{id}/song-requests", post(handler::add_song_request))
        .route(
            "/{id}/song-requests/{index}/status",
            put(handler::set_song_request_status),
        )
        .route("/{id}/close", post(handler::close))
        .route_layer(middleware::from_fn(require_role(&[ROLE_STAFF])))
}
