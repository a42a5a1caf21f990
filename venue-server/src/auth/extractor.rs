//! Current-user extractor
//!
//! Lets guarded handlers take `current: CurrentUser` as an argument. The
//! authentication middleware is the only place tokens are validated; it
//! inserts the identity into the request extensions, and this extractor
//! reads it back out. A missing extension means the route was wired outside
//! the auth layer, which is refused rather than silently allowed.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppError;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(AppError::unauthorized)
    }
}
