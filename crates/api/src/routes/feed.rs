//! Route definition for the merged feed.

use axum::routing::get;
use axum::Router;

use crate::handlers::feed;
use crate::state::AppState;

/// Routes mounted at `/feed`.
///
/// ```text
/// GET /feed    -> get_feed
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/feed", get(feed::get_feed))
}
