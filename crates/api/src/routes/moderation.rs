//! Route definitions for the `/moderation` resource.
//!
//! All endpoints require the moderator role (checked in the handlers).

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::moderation;
use crate::state::AppState;

/// Routes mounted at `/moderation`.
///
/// ```text
/// POST   /throttles                      -> apply_throttle
/// GET    /throttles/{user_id}            -> list_throttles
/// DELETE /throttles/{id}                 -> lift_throttle
/// GET    /spoof-detections               -> list_pending_detections
/// POST   /spoof-detections/{id}/confirm  -> confirm_detection
/// POST   /spoof-detections/{id}/dismiss  -> dismiss_detection
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/throttles", post(moderation::apply_throttle))
        .route(
            "/throttles/{user_id}",
            get(moderation::list_throttles).delete(moderation::lift_throttle),
        )
        .route("/spoof-detections", get(moderation::list_pending_detections))
        .route("/spoof-detections/{id}/confirm", post(moderation::confirm_detection))
        .route("/spoof-detections/{id}/dismiss", post(moderation::dismiss_detection))
}
