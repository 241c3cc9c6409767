//! Handler for the raw geo-index query.
//!
//! `/nearby` is the bare contract: artifacts within a radius, distance
//! ascending, moderation rules applied. No recency boost, no merged
//! sources — that is `/feed`.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use pulse_core::error::CoreError;
use pulse_core::geo::{self, GeoPoint};
use pulse_core::status::ArtifactKind;
use pulse_core::types::DbId;
use pulse_core::visibility::artifact_visible;
use pulse_db::repositories::{ArtifactRepo, ThrottleRepo};
use serde::Deserialize;

use crate::error::AppResult;
use crate::handlers::artifact_preview;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /api/v1/nearby`.
#[derive(Debug, Deserialize)]
pub struct NearbyParams {
    pub lat: f64,
    pub lng: f64,
    /// Defaults to `pulse_core::geo::DEFAULT_RADIUS_M`.
    pub radius_m: Option<i32>,
    /// Optional kind filter (`chat`, `board_post`, `announce`).
    pub kind: Option<String>,
}

/// GET /api/v1/nearby
///
/// Artifacts within the radius of a point, sorted by exact distance.
pub async fn nearby(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<NearbyParams>,
) -> AppResult<impl IntoResponse> {
    geo::validate_coordinates(params.lat, params.lng)?;
    let radius_m = params.radius_m.unwrap_or(geo::DEFAULT_RADIUS_M);
    geo::validate_radius(radius_m)?;

    let kind = match &params.kind {
        Some(label) => Some(ArtifactKind::from_label(label).ok_or_else(|| {
            CoreError::Validation(format!("Unknown artifact kind '{label}'"))
        })?),
        None => None,
    };

    let center = GeoPoint::new(params.lat, params.lng);
    let now = Utc::now();
    let results = ArtifactRepo::nearby(&state.pool, center, radius_m as f64, kind, now).await?;

    // Resolve throttle reductions for every distinct owner in one query.
    let owner_ids: Vec<DbId> = {
        let mut ids: Vec<DbId> = results.iter().map(|(a, _)| a.owner_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    };
    let reductions: HashMap<DbId, f64> =
        ThrottleRepo::effective_reductions(&state.pool, &owner_ids, now)
            .await?
            .into_iter()
            .map(|r| (r.user_id, r.reduction))
            .collect();

    let viewer = auth.viewer();
    let visible: Vec<_> = results
        .iter()
        .filter(|(artifact, distance)| {
            let reduction = reductions.get(&artifact.owner_id).copied().unwrap_or(0.0);
            artifact_visible(
                artifact.status(),
                artifact.owner_id,
                artifact.id,
                &viewer,
                reduction,
                *distance,
                artifact.visibility_radius_m,
            )
        })
        .map(|(artifact, distance)| artifact_preview(artifact, *distance, &viewer))
        .collect();

    tracing::debug!(
        lat = params.lat,
        lng = params.lng,
        radius_m,
        results = visible.len(),
        user_id = auth.user_id,
        "Nearby query executed",
    );

    Ok(Json(DataResponse { data: visible }))
}
