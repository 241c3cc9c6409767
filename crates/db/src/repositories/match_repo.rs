//! Read-model over `users` + `location_points`: nearby match candidates.
//!
//! There is no `match_candidates` table; a candidate is any other user whose
//! *latest* location point falls inside the query window. Compatibility
//! filtering (preferences, prior interactions) belongs to the matching
//! collaborator, not this engine.

use pulse_core::geo::{BoundingBox, GeoPoint};
use pulse_core::geo_index::refine_and_sort;
use pulse_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::feed::MatchCandidateRow;

/// Cap on bounding-box candidates fetched per query.
const CANDIDATE_LIMIT: i64 = 200;

/// Provides the nearby-candidate read model.
pub struct MatchRepo;

impl MatchRepo {
    /// Other users whose latest location is within `radius_m` of `center`,
    /// distance ascending.
    ///
    /// The bounding box applies to each user's latest point only — a user
    /// who was nearby yesterday but reported elsewhere since does not
    /// appear. Stale candidates (no report since `seen_since`) are dropped.
    pub async fn nearby_candidates(
        pool: &PgPool,
        viewer_id: DbId,
        center: GeoPoint,
        radius_m: f64,
        seen_since: Timestamp,
    ) -> Result<Vec<(MatchCandidateRow, f64)>, sqlx::Error> {
        let bbox = BoundingBox::around(center, radius_m);

        let candidates = sqlx::query_as::<_, MatchCandidateRow>(
            "SELECT * FROM ( \
                 SELECT DISTINCT ON (lp.user_id) \
                     lp.user_id, u.display_name, lp.latitude, lp.longitude, lp.recorded_at \
                 FROM location_points lp \
                 JOIN users u ON u.id = lp.user_id \
                 WHERE lp.user_id <> $1 \
                 ORDER BY lp.user_id, lp.recorded_at DESC \
             ) latest \
             WHERE latest.latitude BETWEEN $2 AND $3 \
               AND latest.longitude BETWEEN $4 AND $5 \
               AND latest.recorded_at >= $6 \
             ORDER BY latest.recorded_at DESC \
             LIMIT $7",
        )
        .bind(viewer_id)
        .bind(bbox.min_lat)
        .bind(bbox.max_lat)
        .bind(bbox.min_lng)
        .bind(bbox.max_lng)
        .bind(seen_since)
        .bind(CANDIDATE_LIMIT)
        .fetch_all(pool)
        .await?;

        Ok(refine_and_sort(candidates, center, radius_m))
    }
}
