//! Venue table API
//!
//! Table CRUD plus the per-table operations: order lines, the song queue,
//! account close and reset. `/by-credential/{credential}` is on the public
//! skip list so a guest device can reach its own table without a login.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_role;
use crate::auth::roles::ROLE_STAFF;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", table_routes())
}

fn table_routes() -> Router<ServerState> {
    // Song-queue routes stay open to any authenticated user; guests at the
    // table queue their own songs.
    let open = Router::new()
        .route("/by-credential/{credential}", get(handler::get_by_credential))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/songs", post(handler::add_song));

    let staff = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/order-lines", post(handler::add_order_line))
        .route(
            "/{id}/order-lines/{index}/state",
            put(handler::set_line_state),
        )
        .route("/{id}/songs/{index}/state", put(handler::set_song_state))
        .route("/{id}/close", post(handler::close_account))
        .route("/{id}/reset", post(handler::reset))
        .route_layer(middleware::from_fn(require_role(&[ROLE_STAFF])));

    open.merge(staff)
}
