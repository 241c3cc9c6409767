//! Proximity artifact entity and DTOs.

use pulse_core::geo::GeoPoint;
use pulse_core::geo_index::Locatable;
use pulse_core::status::{ArtifactKind, ModerationStatus, StatusId};
use pulse_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `proximity_artifacts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Artifact {
    pub id: DbId,
    pub owner_id: DbId,
    pub kind_id: StatusId,
    pub content: String,
    pub latitude: f64,
    pub longitude: f64,
    pub visibility_radius_m: i32,
    pub moderation_status_id: StatusId,
    pub flag_count: i32,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Artifact {
    /// Typed kind; `None` only if the row predates the current enum set.
    pub fn kind(&self) -> Option<ArtifactKind> {
        ArtifactKind::from_id(self.kind_id)
    }

    /// Typed moderation status, defaulting unknown ids to `Removed` so a
    /// bad row fails closed rather than leaking.
    pub fn status(&self) -> ModerationStatus {
        ModerationStatus::from_id(self.moderation_status_id).unwrap_or(ModerationStatus::Removed)
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

impl Locatable for Artifact {
    fn location(&self) -> GeoPoint {
        Artifact::location(self)
    }
    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

/// DTO for `POST /api/v1/artifacts`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateArtifact {
    /// Wire label of the artifact kind (`chat`, `board_post`, `announce`).
    pub kind: String,
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Defaults to `pulse_core::geo::DEFAULT_RADIUS_M`.
    #[validate(range(min = 100, max = 10000))]
    pub visibility_radius_m: Option<i32>,
}

/// Acknowledgement payload for `POST /api/v1/artifacts/{id}/flag`.
#[derive(Debug, Serialize)]
pub struct FlagAck {
    pub recorded: bool,
}
