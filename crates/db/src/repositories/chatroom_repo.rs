//! Repository for the `proximity_chatrooms` table (feed source, read-only).

use pulse_core::geo::{BoundingBox, GeoPoint};
use pulse_core::geo_index::refine_and_sort;
use pulse_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::chatroom::ProximityChatroom;

/// Column list for `proximity_chatrooms` queries.
const COLUMNS: &str = "\
    id, name, description, latitude, longitude, radius_m, created_by, \
    is_active, member_count, last_activity_at, expires_at, created_at";

/// Cap on bounding-box candidates fetched per query.
const CANDIDATE_LIMIT: i64 = 100;

/// Provides geo queries over proximity chatrooms.
pub struct ChatroomRepo;

impl ChatroomRepo {
    /// Active, unexpired chatrooms within `radius_m` of `center`, distance
    /// ascending.
    pub async fn nearby(
        pool: &PgPool,
        center: GeoPoint,
        radius_m: f64,
        now: Timestamp,
    ) -> Result<Vec<(ProximityChatroom, f64)>, sqlx::Error> {
        let bbox = BoundingBox::around(center, radius_m);

        let query = format!(
            "SELECT {COLUMNS} FROM proximity_chatrooms \
             WHERE is_active \
               AND (expires_at IS NULL OR expires_at > $1) \
               AND latitude BETWEEN $2 AND $3 \
               AND longitude BETWEEN $4 AND $5 \
             ORDER BY last_activity_at DESC NULLS LAST \
             LIMIT {CANDIDATE_LIMIT}"
        );
        let candidates = sqlx::query_as::<_, ProximityChatroom>(&query)
            .bind(now)
            .bind(bbox.min_lat)
            .bind(bbox.max_lat)
            .bind(bbox.min_lng)
            .bind(bbox.max_lng)
            .fetch_all(pool)
            .await?;

        Ok(refine_and_sort(candidates, center, radius_m))
    }
}
