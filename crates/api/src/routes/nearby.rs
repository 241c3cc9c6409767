//! Route definition for the raw geo-index query.

use axum::routing::get;
use axum::Router;

use crate::handlers::nearby;
use crate::state::AppState;

/// Routes mounted at `/nearby`.
///
/// ```text
/// GET /nearby    -> nearby
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/nearby", get(nearby::nearby))
}
