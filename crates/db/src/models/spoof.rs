//! Geo-spoof detection entity and DTOs.

use pulse_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `geo_spoof_detections` table.
///
/// Created automatically when an evaluation crosses the review threshold.
/// `confirmed` flips only through a moderator action; the engine itself
/// never punishes on suspicion alone.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GeoSpoofDetection {
    pub id: DbId,
    pub user_id: DbId,
    pub claimed_lat: f64,
    pub claimed_lng: f64,
    pub ip_lat: Option<f64>,
    pub ip_lng: Option<f64>,
    pub distance_km: Option<f64>,
    pub velocity_kmh: Option<f64>,
    pub suspicion_score: i16,
    /// JSON array of signal tags, e.g. `["impossible_velocity"]`.
    pub signals: serde_json::Value,
    pub confirmed: bool,
    /// Reviewing moderator; `None` while the detection is pending.
    pub reviewed_by: Option<DbId>,
    pub detected_at: Timestamp,
}

/// DTO for `POST /api/v1/moderation/spoof-detections/{id}/confirm`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ConfirmSpoof {
    /// Severity of the geo-spoof throttle applied on confirmation.
    #[validate(range(min = 1, max = 5))]
    pub severity: Option<i16>,
    #[validate(range(min = 1, max = 8760))]
    pub duration_hours: Option<i64>,
}
