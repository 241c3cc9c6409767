//! Handler for location updates and the spoof evaluation they trigger.

use std::net::IpAddr;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use pulse_core::geo;
use pulse_core::spoof::{self, PreviousPoint, SpoofContext};
use pulse_db::models::location::RecordLocation;
use pulse_db::repositories::{LocationRepo, SpoofRepo};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/location
///
/// Append a location point (last write wins as "current position") and run
/// the spoof evaluation. The response never carries the suspicion score —
/// telling a spoofer they tripped a detector defeats the detector.
pub async fn record_location(
    auth: AuthUser,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RecordLocation>,
) -> AppResult<impl IntoResponse> {
    geo::validate_coordinates(input.latitude, input.longitude)?;
    if input.accuracy_m.is_some_and(|a| !a.is_finite() || a < 0.0) {
        return Err(pulse_core::error::CoreError::Validation(
            "Accuracy must be a non-negative number of meters".to_string(),
        )
        .into());
    }

    let now = Utc::now();
    let (previous, point) = LocationRepo::append(&state.pool, auth.user_id, &input, now).await?;

    // -- Spoof evaluation -----------------------------------------------------
    // Best-effort IP lookup; on timeout or absence the signal is skipped.
    let ip_location = match client_ip(&headers) {
        Some(ip) => state.geolocator.locate(ip).await,
        None => None,
    };

    let repeat_window = now - chrono::Duration::hours(spoof::REPEAT_PATTERN_WINDOW_HOURS);
    let recent_detections = SpoofRepo::recent_count(&state.pool, auth.user_id, repeat_window)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Spoof: recent-detection count failed; skipping signal");
            0
        });

    let evaluation = spoof::evaluate(
        &SpoofContext {
            claimed: point.location(),
            ip_location,
            previous: previous
                .as_ref()
                .map(|p| PreviousPoint { location: p.location(), recorded_at: p.recorded_at }),
            recent_detections,
        },
        now,
    );

    if evaluation.needs_review() {
        // A pending record for human review. Never an automatic throttle:
        // travelers legitimately trip velocity and IP signals.
        match SpoofRepo::insert(
            &state.pool,
            auth.user_id,
            point.location(),
            ip_location,
            &evaluation,
            now,
        )
        .await
        {
            Ok(detection) => tracing::info!(
                detection_id = detection.id,
                user_id = auth.user_id,
                score = evaluation.suspicion_score,
                "Spoof detection recorded for review",
            ),
            // The location update itself succeeded; detection persistence is
            // secondary and must not fail the request.
            Err(e) => tracing::error!(error = %e, "Spoof: detection insert failed"),
        }
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: point })))
}

/// Client address from `X-Forwarded-For` (the engine always sits behind a
/// proxy that sets it). First hop wins.
fn client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok())
}
