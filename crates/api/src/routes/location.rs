//! Route definition for location updates.

use axum::routing::post;
use axum::Router;

use crate::handlers::location;
use crate::state::AppState;

/// Routes mounted at `/location`.
///
/// ```text
/// POST /location    -> record_location
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/location", post(location::record_location))
}
