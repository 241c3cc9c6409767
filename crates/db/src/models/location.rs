//! Location point entity and DTOs.
//!
//! The table is an append-only log per user; "current position" is just the
//! newest row. History exists solely for spoof detection.

use pulse_core::geo::GeoPoint;
use pulse_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `location_points` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LocationPoint {
    pub id: DbId,
    pub user_id: DbId,
    pub latitude: f64,
    pub longitude: f64,
    /// Reported GPS accuracy, meters.
    pub accuracy_m: Option<f64>,
    pub recorded_at: Timestamp,
    pub created_at: Timestamp,
}

impl LocationPoint {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// DTO for `POST /api/v1/location`.
#[derive(Debug, Deserialize)]
pub struct RecordLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: Option<f64>,
}
