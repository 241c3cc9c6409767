//! Route definitions for the `/artifacts` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::artifacts;
use crate::state::AppState;

/// Routes mounted at `/artifacts`.
///
/// ```text
/// POST   /            -> create_artifact
/// GET    /{id}        -> get_artifact
/// DELETE /{id}        -> delete_artifact
/// POST   /{id}/flag   -> flag_artifact
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(artifacts::create_artifact))
        .route(
            "/{id}",
            get(artifacts::get_artifact).delete(artifacts::delete_artifact),
        )
        .route("/{id}/flag", post(artifacts::flag_artifact))
}
