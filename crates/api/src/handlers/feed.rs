//! Feed composer: merges artifacts, chatrooms, and match candidates into one
//! ranked, paginated feed.
//!
//! The three sources are queried concurrently and independently. A failing
//! source degrades the response (`partial: true`) instead of failing the
//! request; a viewer with no known location gets an empty page with
//! `location_required: true` rather than a global feed.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use pulse_core::feed::{clamp_page_size, paginate, rank};
use pulse_core::geo::{self, GeoPoint};
use pulse_core::types::DbId;
use pulse_core::visibility::{artifact_visible, should_suppress};
use pulse_db::models::feed::{CandidatePreview, ChatroomPreview, FeedItem, FeedResponse};
use pulse_db::repositories::{ArtifactRepo, ChatroomRepo, LocationRepo, MatchRepo, ThrottleRepo};
use serde::Deserialize;

use crate::error::AppResult;
use crate::handlers::artifact_preview;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /api/v1/feed`.
#[derive(Debug, Deserialize)]
pub struct FeedParams {
    /// Explicit center; falls back to the viewer's latest stored location.
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_m: Option<i32>,
    /// 1-based page number.
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// GET /api/v1/feed
///
/// The merged local feed. Ranking is by effective distance (real distance
/// minus recency boost), ties newest-first; the total is counted after
/// moderation filtering.
pub async fn get_feed(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<FeedParams>,
) -> AppResult<impl IntoResponse> {
    let page = params.page.unwrap_or(1).max(1);
    let page_size = clamp_page_size(params.page_size);

    // Resolve the viewer's center: explicit coordinates win, then the
    // latest stored location point. Without either there is no feed.
    let center = match (params.lat, params.lng) {
        (Some(lat), Some(lng)) => {
            geo::validate_coordinates(lat, lng)?;
            Some(GeoPoint::new(lat, lng))
        }
        _ => LocationRepo::latest(&state.pool, auth.user_id)
            .await?
            .map(|p| p.location()),
    };
    let Some(center) = center else {
        return Ok(Json(DataResponse {
            data: FeedResponse::location_required(page, page_size),
        }));
    };

    let radius_m = params.radius_m.unwrap_or(geo::DEFAULT_RADIUS_M);
    geo::validate_radius(radius_m)?;
    let radius = radius_m as f64;

    let now = Utc::now();
    let seen_since = now - chrono::Duration::hours(state.config.candidate_freshness_hours);

    // -- Query the three sources concurrently and independently -------------
    let (artifacts, chatrooms, candidates) = tokio::join!(
        ArtifactRepo::nearby(&state.pool, center, radius, None, now),
        ChatroomRepo::nearby(&state.pool, center, radius, now),
        MatchRepo::nearby_candidates(&state.pool, auth.user_id, center, radius, seen_since),
    );

    let mut partial = false;
    let artifacts = artifacts.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Feed source failed: artifacts");
        partial = true;
        Vec::new()
    });
    let chatrooms = chatrooms.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Feed source failed: chatrooms");
        partial = true;
        Vec::new()
    });
    let mut candidates = candidates.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Feed source failed: candidates");
        partial = true;
        Vec::new()
    });

    // -- Resolve throttle reductions for owners and candidates ---------------
    // If this lookup fails we cannot filter correctly, so the throttled
    // sources (artifacts, candidates) are dropped rather than leaked.
    let mut throttled_ids: Vec<DbId> = artifacts
        .iter()
        .map(|(a, _)| a.owner_id)
        .chain(candidates.iter().map(|(c, _)| c.user_id))
        .collect();
    throttled_ids.sort_unstable();
    throttled_ids.dedup();

    let viewer = auth.viewer();
    let mut items: Vec<FeedItem> = Vec::new();

    match ThrottleRepo::effective_reductions(&state.pool, &throttled_ids, now).await {
        Ok(rows) => {
            let reductions: HashMap<DbId, f64> =
                rows.into_iter().map(|r| (r.user_id, r.reduction)).collect();

            for (artifact, distance) in &artifacts {
                let reduction = reductions.get(&artifact.owner_id).copied().unwrap_or(0.0);
                if artifact_visible(
                    artifact.status(),
                    artifact.owner_id,
                    artifact.id,
                    &viewer,
                    reduction,
                    *distance,
                    artifact.visibility_radius_m,
                ) {
                    items.push(FeedItem::Artifact(artifact_preview(artifact, *distance, &viewer)));
                }
            }

            candidates.retain(|(candidate, _)| {
                let reduction = reductions.get(&candidate.user_id).copied().unwrap_or(0.0);
                viewer.is_moderator
                    || !should_suppress(viewer.user_id, candidate.user_id, reduction)
            });
            for (candidate, distance) in candidates {
                items.push(FeedItem::Candidate(CandidatePreview {
                    user_id: candidate.user_id,
                    display_name: candidate.display_name,
                    distance_m: distance,
                    last_seen_at: candidate.recorded_at,
                }));
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Throttle lookup failed; dropping throttled sources");
            partial = true;
        }
    }

    for (room, distance) in chatrooms {
        items.push(FeedItem::Chatroom(chatroom_preview(room, distance)));
    }

    // -- Rank and paginate ----------------------------------------------------
    rank(&mut items, now);
    let ranked = paginate(items, page, page_size);

    tracing::debug!(
        lat = center.latitude,
        lng = center.longitude,
        radius_m,
        total = ranked.total,
        partial,
        user_id = auth.user_id,
        "Feed composed",
    );

    Ok(Json(DataResponse {
        data: FeedResponse {
            items: ranked.items,
            page: ranked.page,
            page_size: ranked.page_size,
            total: ranked.total,
            partial,
            location_required: false,
        },
    }))
}

fn chatroom_preview(
    room: pulse_db::models::chatroom::ProximityChatroom,
    distance_m: f64,
) -> ChatroomPreview {
    ChatroomPreview {
        id: room.id,
        name: room.name,
        description: room.description,
        latitude: room.latitude,
        longitude: room.longitude,
        radius_m: room.radius_m,
        member_count: room.member_count,
        distance_m,
        created_at: room.created_at,
    }
}
