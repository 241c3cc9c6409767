//! Handlers for artifact creation, fetch, flagging, and owner removal.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use pulse_core::artifact::{daily_cap, expires_at, sanitize_content};
use pulse_core::error::CoreError;
use pulse_core::geo::{self, GeoPoint};
use pulse_core::status::ArtifactKind;
use pulse_core::throttle::{auto_throttle_tier, reduction_for_severity, AUTO_THROTTLE_REASON};
use pulse_core::types::{DbId, Timestamp};
use pulse_db::models::artifact::{CreateArtifact, FlagAck};
use pulse_db::repositories::{ArtifactRepo, ThrottleRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::artifact_preview;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Window over which an owner's flag total feeds the auto-throttle ladder.
const FLAG_WINDOW_DAYS: i64 = 7;

/// POST /api/v1/artifacts
///
/// Create an artifact at the caller's coordinates. Content is sanitized,
/// the per-kind daily cap enforced, and the expiry stamped from the kind's
/// TTL.
pub async fn create_artifact(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateArtifact>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    geo::validate_coordinates(input.latitude, input.longitude)?;

    let kind = ArtifactKind::from_label(&input.kind)
        .ok_or_else(|| CoreError::Validation(format!("Unknown artifact kind '{}'", input.kind)))?;
    let content = sanitize_content(&input.content)?;
    let radius_m = input.visibility_radius_m.unwrap_or(geo::DEFAULT_RADIUS_M);
    geo::validate_radius(radius_m)?;

    let now = Utc::now();
    let created_today =
        ArtifactRepo::count_created_since(&state.pool, auth.user_id, kind, start_of_utc_day(now))
            .await?;
    if created_today >= daily_cap(kind) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Daily posting cap reached for kind '{}'",
            kind.label()
        ))));
    }

    let artifact = ArtifactRepo::insert(
        &state.pool,
        auth.user_id,
        kind,
        &content,
        GeoPoint::new(input.latitude, input.longitude),
        radius_m,
        expires_at(kind, now),
    )
    .await?;

    tracing::info!(
        artifact_id = artifact.id,
        kind = kind.label(),
        user_id = auth.user_id,
        "Artifact created",
    );

    let viewer = auth.viewer();
    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: artifact_preview(&artifact, 0.0, &viewer) }),
    ))
}

/// GET /api/v1/artifacts/{id}
///
/// Direct fetch. Terminal artifacts 404; flagged artifacts 404 for anyone
/// but the owner and moderators (their existence is not disclosed).
/// Hash-based suppression applies to query surfaces, not direct fetches.
pub async fn get_artifact(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let artifact = ArtifactRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "artifact", id })?;

    let viewer = auth.viewer();
    let status = artifact.status();
    let owner_or_moderator = viewer.is_moderator || viewer.user_id == artifact.owner_id;

    if status.is_terminal()
        || (status == pulse_core::status::ModerationStatus::Flagged && !owner_or_moderator)
    {
        return Err(AppError::Core(CoreError::NotFound { entity: "artifact", id }));
    }

    Ok(Json(DataResponse { data: artifact_preview(&artifact, 0.0, &viewer) }))
}

/// POST /api/v1/artifacts/{id}/flag
///
/// Record a flag. Three flags escalate a clean artifact to `Flagged`; the
/// owner's recent flag total may additionally trip an automatic shadow
/// throttle. The response never reveals either outcome.
pub async fn flag_artifact(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let artifact = ArtifactRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "artifact", id })?;
    if artifact.owner_id == auth.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "Cannot flag your own artifact".to_string(),
        )));
    }

    let flagged = ArtifactRepo::record_flag(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "artifact", id })?;

    tracing::info!(
        artifact_id = id,
        flag_count = flagged.flag_count,
        reporter_id = auth.user_id,
        "Artifact flagged",
    );

    maybe_auto_throttle(&state, flagged.owner_id, Utc::now()).await;

    Ok(Json(DataResponse { data: FlagAck { recorded: true } }))
}

/// DELETE /api/v1/artifacts/{id}
///
/// Owner soft-delete: the artifact becomes a `Removed` tombstone.
pub async fn delete_artifact(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let removed = ArtifactRepo::remove_by_owner(&state.pool, id, auth.user_id).await?;
    if removed.is_none() {
        return Err(AppError::Core(CoreError::NotFound { entity: "artifact", id }));
    }

    tracing::info!(artifact_id = id, user_id = auth.user_id, "Artifact removed by owner");
    Ok(StatusCode::NO_CONTENT)
}

/// Apply the flag-driven auto-throttle ladder for `owner_id`.
///
/// Fire-and-forget from the caller's perspective: a failure here must not
/// fail the flag request, so errors are logged and swallowed.
async fn maybe_auto_throttle(state: &AppState, owner_id: DbId, now: Timestamp) {
    let since = now - chrono::Duration::days(FLAG_WINDOW_DAYS);

    let flag_total = match ArtifactRepo::owner_flag_total(&state.pool, owner_id, since).await {
        Ok(total) => total,
        Err(e) => {
            tracing::error!(error = %e, owner_id, "Auto-throttle: flag total query failed");
            return;
        }
    };
    let Some(tier) = auto_throttle_tier(flag_total) else {
        return;
    };

    // Never stack a weaker or equal tier on an already-active throttle.
    let current = ThrottleRepo::max_active_severity(&state.pool, owner_id, AUTO_THROTTLE_REASON, now)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, owner_id, "Auto-throttle: severity query failed");
            Some(pulse_core::throttle::MAX_SEVERITY)
        });
    if current.is_some_and(|severity| severity >= tier.severity) {
        return;
    }

    let reduction = match reduction_for_severity(tier.severity) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "Auto-throttle: invalid tier severity");
            return;
        }
    };

    let result = ThrottleRepo::apply(
        &state.pool,
        owner_id,
        AUTO_THROTTLE_REASON,
        tier.severity,
        reduction,
        now,
        Some(now + chrono::Duration::hours(tier.duration_hours)),
        Some(&format!("Auto-throttle: {flag_total} flags in {FLAG_WINDOW_DAYS} days")),
        None,
    )
    .await;

    match result {
        Ok(throttle) => tracing::info!(
            owner_id,
            severity = tier.severity,
            throttle_id = throttle.id,
            "Auto-throttle applied",
        ),
        Err(e) => tracing::error!(error = %e, owner_id, "Auto-throttle: insert failed"),
    }
}

/// Midnight UTC of the day containing `now` (daily-cap accounting boundary).
fn start_of_utc_day(now: Timestamp) -> Timestamp {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc()
}
