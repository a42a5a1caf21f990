//! Closing history API (staff only, read plus manual append)

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_role;
use crate::auth::roles::ROLE_STAFF;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/closings", closing_routes())
}

fn closing_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route_layer(middleware::from_fn(require_role(&[ROLE_STAFF])))
}
