//! Feed response DTOs: previews for each source plus the merged page shape.
//!
//! Previews carry the *fuzzed* coordinates handed to clients; true
//! coordinates never leave the handlers except for owners and moderators.

use pulse_core::feed::Rankable;
use pulse_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Lightweight artifact projection for feed/nearby responses.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactPreview {
    pub id: DbId,
    pub owner_id: DbId,
    pub kind: &'static str,
    pub content: String,
    pub latitude: f64,
    pub longitude: f64,
    pub visibility_radius_m: i32,
    pub moderation_status: &'static str,
    pub distance_m: f64,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

/// Lightweight chatroom projection for feed responses.
#[derive(Debug, Clone, Serialize)]
pub struct ChatroomPreview {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: i32,
    pub member_count: i32,
    pub distance_m: f64,
    pub created_at: Timestamp,
}

/// Nearby-user preview surfaced among feed results.
#[derive(Debug, Clone, Serialize)]
pub struct CandidatePreview {
    pub user_id: DbId,
    pub display_name: String,
    pub distance_m: f64,
    /// When the candidate last reported a location.
    pub last_seen_at: Timestamp,
}

/// Raw candidate row: each user's latest location joined with their profile.
#[derive(Debug, Clone, FromRow)]
pub struct MatchCandidateRow {
    pub user_id: DbId,
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub recorded_at: Timestamp,
}

impl pulse_core::geo_index::Locatable for MatchCandidateRow {
    fn location(&self) -> pulse_core::geo::GeoPoint {
        pulse_core::geo::GeoPoint::new(self.latitude, self.longitude)
    }
    fn created_at(&self) -> Timestamp {
        self.recorded_at
    }
}

/// One entry in the merged feed.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum FeedItem {
    Artifact(ArtifactPreview),
    Chatroom(ChatroomPreview),
    Candidate(CandidatePreview),
}

impl Rankable for FeedItem {
    fn distance_m(&self) -> f64 {
        match self {
            FeedItem::Artifact(a) => a.distance_m,
            FeedItem::Chatroom(c) => c.distance_m,
            FeedItem::Candidate(c) => c.distance_m,
        }
    }

    fn created_at(&self) -> Timestamp {
        match self {
            FeedItem::Artifact(a) => a.created_at,
            FeedItem::Chatroom(c) => c.created_at,
            // Candidates have no creation moment; recency is their last
            // location report.
            FeedItem::Candidate(c) => c.last_seen_at,
        }
    }
}

/// `GET /api/v1/feed` response body.
#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub items: Vec<FeedItem>,
    pub page: i64,
    pub page_size: i64,
    /// Counted after moderation filtering; suppressed items do not leak
    /// through the total.
    pub total: i64,
    /// True when at least one source query failed and was skipped.
    pub partial: bool,
    /// True when the viewer has no known location; the feed never falls
    /// back to a global view.
    pub location_required: bool,
}

impl FeedResponse {
    /// The empty response returned when the viewer's location is unknown.
    pub fn location_required(page: i64, page_size: i64) -> Self {
        Self {
            items: Vec::new(),
            page,
            page_size,
            total: 0,
            partial: false,
            location_required: true,
        }
    }
}
