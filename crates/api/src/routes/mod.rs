pub mod artifacts;
pub mod feed;
pub mod health;
pub mod location;
pub mod moderation;
pub mod nearby;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /nearby                                    raw geo-index query
/// /feed                                      merged ranked feed
///
/// /artifacts                                 create (POST)
/// /artifacts/{id}                            get, delete (owner)
/// /artifacts/{id}/flag                       flag (POST)
///
/// /location                                  append location point (POST)
///
/// /moderation/throttles                      apply (POST, moderator)
/// /moderation/throttles/{user_id}            history (GET, moderator)
/// /moderation/throttles/{id}                 lift (DELETE, moderator)
/// /moderation/spoof-detections               pending queue (GET, moderator)
/// /moderation/spoof-detections/{id}/confirm  confirm (POST, moderator)
/// /moderation/spoof-detections/{id}/dismiss  dismiss (POST, moderator)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(nearby::router())
        .merge(feed::router())
        .nest("/artifacts", artifacts::router())
        .merge(location::router())
        .nest("/moderation", moderation::router())
}
