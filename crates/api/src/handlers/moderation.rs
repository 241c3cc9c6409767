//! Moderator-only handlers: shadow throttles and spoof detection review.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use pulse_core::error::CoreError;
use pulse_core::status::ThrottleReason;
use pulse_core::throttle::reduction_for_severity;
use pulse_core::types::DbId;
use pulse_db::models::spoof::ConfirmSpoof;
use pulse_db::models::throttle::{ApplyThrottle, ThrottleView};
use pulse_db::repositories::{SpoofRepo, ThrottleRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default severity/duration for a confirmed geo-spoof throttle.
const SPOOF_THROTTLE_SEVERITY: i16 = 3;
const SPOOF_THROTTLE_HOURS: i64 = 72;

/// Default page size for the pending-detection queue.
const DEFAULT_PENDING_LIMIT: i64 = 50;
const MAX_PENDING_LIMIT: i64 = 200;

// ---------------------------------------------------------------------------
// Shadow throttles
// ---------------------------------------------------------------------------

/// GET /api/v1/moderation/throttles/{user_id}
///
/// Full throttle history for a user, newest first, annotated with whether
/// each record is currently active.
pub async fn list_throttles(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    auth.require_moderator()?;

    let now = Utc::now();
    let throttles: Vec<ThrottleView> = ThrottleRepo::list_for_user(&state.pool, user_id)
        .await?
        .into_iter()
        .map(|t| ThrottleView::at(t, now))
        .collect();
    Ok(Json(DataResponse { data: throttles }))
}

/// POST /api/v1/moderation/throttles
///
/// Apply a shadow throttle. The visibility reduction derives from severity;
/// moderators pick the rung, not the number.
pub async fn apply_throttle(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ApplyThrottle>,
) -> AppResult<impl IntoResponse> {
    auth.require_moderator()?;
    input.validate()?;

    let reason = ThrottleReason::from_label(&input.reason).ok_or_else(|| {
        CoreError::Validation(format!("Unknown throttle reason '{}'", input.reason))
    })?;
    let reduction = reduction_for_severity(input.severity)?;

    let now = Utc::now();
    let expires_at = input.duration_hours.map(|h| now + chrono::Duration::hours(h));

    let throttle = ThrottleRepo::apply(
        &state.pool,
        input.user_id,
        reason,
        input.severity,
        reduction,
        now,
        expires_at,
        input.notes.as_deref(),
        Some(auth.user_id),
    )
    .await?;

    tracing::info!(
        throttle_id = throttle.id,
        target_user = input.user_id,
        severity = input.severity,
        reason = reason.label(),
        moderator_id = auth.user_id,
        "Shadow throttle applied",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: throttle })))
}

/// DELETE /api/v1/moderation/throttles/{id}
///
/// Lift an active throttle (expire it now). The record stays as history.
pub async fn lift_throttle(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    auth.require_moderator()?;

    let lifted = ThrottleRepo::lift(&state.pool, id, Utc::now()).await?;
    let Some(throttle) = lifted else {
        return Err(AppError::Core(CoreError::NotFound { entity: "shadow_throttle", id }));
    };

    tracing::info!(throttle_id = id, moderator_id = auth.user_id, "Shadow throttle lifted");
    Ok(Json(DataResponse { data: throttle }))
}

// ---------------------------------------------------------------------------
// Spoof detections
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/v1/moderation/spoof-detections`.
#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    pub limit: Option<i64>,
}

/// GET /api/v1/moderation/spoof-detections
///
/// The pending review queue, newest first.
pub async fn list_pending_detections(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PendingQuery>,
) -> AppResult<impl IntoResponse> {
    auth.require_moderator()?;

    let limit = query.limit.unwrap_or(DEFAULT_PENDING_LIMIT).clamp(1, MAX_PENDING_LIMIT);
    let pending = SpoofRepo::list_pending(&state.pool, limit).await?;
    Ok(Json(DataResponse { data: pending }))
}

/// POST /api/v1/moderation/spoof-detections/{id}/confirm
///
/// Confirm a detection as real spoofing. This is the human action that
/// actually punishes: confirmation applies a `geo_spoof` shadow throttle.
pub async fn confirm_detection(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    input: Option<Json<ConfirmSpoof>>,
) -> AppResult<impl IntoResponse> {
    auth.require_moderator()?;
    let input = input.map(|Json(i)| i).unwrap_or_default();
    input.validate()?;

    let detection = SpoofRepo::review(&state.pool, id, auth.user_id, true)
        .await?
        .ok_or(CoreError::NotFound { entity: "spoof_detection", id })?;

    let severity = input.severity.unwrap_or(SPOOF_THROTTLE_SEVERITY);
    let reduction = reduction_for_severity(severity)?;
    let duration = input.duration_hours.unwrap_or(SPOOF_THROTTLE_HOURS);
    let now = Utc::now();

    let throttle = ThrottleRepo::apply(
        &state.pool,
        detection.user_id,
        ThrottleReason::GeoSpoof,
        severity,
        reduction,
        now,
        Some(now + chrono::Duration::hours(duration)),
        Some(&format!("Confirmed spoof detection {id}")),
        Some(auth.user_id),
    )
    .await?;

    tracing::info!(
        detection_id = id,
        target_user = detection.user_id,
        throttle_id = throttle.id,
        moderator_id = auth.user_id,
        "Spoof detection confirmed",
    );

    Ok(Json(DataResponse { data: detection }))
}

/// POST /api/v1/moderation/spoof-detections/{id}/dismiss
///
/// Dismiss a detection as a false positive (a traveler, usually). No
/// throttle is applied; the record leaves the pending queue.
pub async fn dismiss_detection(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    auth.require_moderator()?;

    let detection = SpoofRepo::review(&state.pool, id, auth.user_id, false)
        .await?
        .ok_or(CoreError::NotFound { entity: "spoof_detection", id })?;

    tracing::info!(detection_id = id, moderator_id = auth.user_id, "Spoof detection dismissed");
    Ok(Json(DataResponse { data: detection }))
}
