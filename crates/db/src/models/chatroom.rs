//! Proximity chatroom read model.
//!
//! Chatroom lifecycle (membership, messages, presence) belongs to an
//! external collaborator; the engine only reads rooms as a feed source.

use pulse_core::geo::GeoPoint;
use pulse_core::geo_index::Locatable;
use pulse_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `proximity_chatrooms` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProximityChatroom {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: i32,
    pub created_by: DbId,
    pub is_active: bool,
    pub member_count: i32,
    pub last_activity_at: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl ProximityChatroom {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

impl Locatable for ProximityChatroom {
    fn location(&self) -> GeoPoint {
        ProximityChatroom::location(self)
    }
    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}
