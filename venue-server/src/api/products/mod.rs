//! Product catalog API
//!
//! Read and search are open to any authenticated user; catalog mutations
//! and CSV import are staff operations.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_role;
use crate::auth::roles::ROLE_STAFF;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", product_routes())
}

fn product_routes() -> Router<ServerState> {
    let open = Router::new()
        .route("/", get(handler::list))
        .route("/available", get(handler::list_available))
        .route("/search", get(handler::search))
        .route("/{id}", get(handler::get_by_id));

    let staff = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/import", post(handler::import))
        .route_layer(middleware::from_fn(require_role(&[ROLE_STAFF])));

    open.merge(staff)
}
