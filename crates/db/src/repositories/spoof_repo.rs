//! Repository for the `geo_spoof_detections` table.

use pulse_core::geo::GeoPoint;
use pulse_core::spoof::SpoofEvaluation;
use pulse_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::spoof::GeoSpoofDetection;

/// Column list for `geo_spoof_detections` queries.
const COLUMNS: &str = "\
    id, user_id, claimed_lat, claimed_lng, ip_lat, ip_lng, \
    distance_km, velocity_kmh, suspicion_score, signals, \
    confirmed, reviewed_by, detected_at";

/// Provides persistence for spoof detections pending moderator review.
pub struct SpoofRepo;

impl SpoofRepo {
    /// Persist a detection from a review-worthy evaluation.
    pub async fn insert(
        pool: &PgPool,
        user_id: DbId,
        claimed: GeoPoint,
        ip_location: Option<GeoPoint>,
        evaluation: &SpoofEvaluation,
        detected_at: Timestamp,
    ) -> Result<GeoSpoofDetection, sqlx::Error> {
        let signals: Vec<&str> = evaluation.signals.iter().map(|s| s.as_str()).collect();
        let signals = serde_json::to_value(signals).unwrap_or_default();

        let query = format!(
            "INSERT INTO geo_spoof_detections \
             (user_id, claimed_lat, claimed_lng, ip_lat, ip_lng, distance_km, \
              velocity_kmh, suspicion_score, signals, confirmed, detected_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, FALSE, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GeoSpoofDetection>(&query)
            .bind(user_id)
            .bind(claimed.latitude)
            .bind(claimed.longitude)
            .bind(ip_location.map(|p| p.latitude))
            .bind(ip_location.map(|p| p.longitude))
            .bind(evaluation.ip_distance_km)
            .bind(evaluation.velocity_kmh)
            .bind(evaluation.suspicion_score)
            .bind(signals)
            .bind(detected_at)
            .fetch_one(pool)
            .await
    }

    /// Detections recorded for a user since `since` (repeat-pattern signal).
    pub async fn recent_count(
        pool: &PgPool,
        user_id: DbId,
        since: Timestamp,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM geo_spoof_detections \
             WHERE user_id = $1 AND detected_at >= $2",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(pool)
        .await
    }

    /// Unreviewed detections, newest first.
    pub async fn list_pending(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<GeoSpoofDetection>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM geo_spoof_detections \
             WHERE reviewed_by IS NULL \
             ORDER BY detected_at DESC LIMIT $1"
        );
        sqlx::query_as::<_, GeoSpoofDetection>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Record a moderator verdict. Only pending detections can be reviewed;
    /// returns `None` when the detection is missing or already reviewed.
    pub async fn review(
        pool: &PgPool,
        id: DbId,
        moderator_id: DbId,
        confirmed: bool,
    ) -> Result<Option<GeoSpoofDetection>, sqlx::Error> {
        let query = format!(
            "UPDATE geo_spoof_detections \
             SET confirmed = $3, reviewed_by = $2 \
             WHERE id = $1 AND reviewed_by IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GeoSpoofDetection>(&query)
            .bind(id)
            .bind(moderator_id)
            .bind(confirmed)
            .fetch_optional(pool)
            .await
    }
}
