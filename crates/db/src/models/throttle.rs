//! Shadow throttle entity and DTOs.

use pulse_core::status::{StatusId, ThrottleReason};
use pulse_core::throttle::ThrottleWindow;
use pulse_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `shadow_throttles` table.
///
/// The owner is never notified of these; they only observe reduced reach.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShadowThrottle {
    pub id: DbId,
    pub user_id: DbId,
    pub reason_id: StatusId,
    pub severity: i16,
    pub visibility_reduction: f64,
    pub started_at: Timestamp,
    /// `None` = permanent until manually lifted.
    pub expires_at: Option<Timestamp>,
    pub notes: Option<String>,
    /// Applying moderator; `None` for automatic throttles.
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
}

impl ShadowThrottle {
    pub fn reason(&self) -> Option<ThrottleReason> {
        ThrottleReason::from_id(self.reason_id)
    }

    pub fn window(&self) -> ThrottleWindow {
        ThrottleWindow {
            started_at: self.started_at,
            expires_at: self.expires_at,
            reduction: self.visibility_reduction,
        }
    }
}

/// DTO for `POST /api/v1/moderation/throttles`.
#[derive(Debug, Deserialize, Validate)]
pub struct ApplyThrottle {
    pub user_id: DbId,
    /// Wire label of the reason (`spam`, `flagged_content`, ...).
    pub reason: String,
    #[validate(range(min = 1, max = 5))]
    pub severity: i16,
    /// `None` = permanent until manually lifted.
    #[validate(range(min = 1, max = 8760))]
    pub duration_hours: Option<i64>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// A `(user_id, max reduction)` pair from the effective-reduction query.
#[derive(Debug, Clone, FromRow)]
pub struct UserReduction {
    pub user_id: DbId,
    pub reduction: f64,
}

/// Throttle row annotated for moderator listings.
#[derive(Debug, Serialize)]
pub struct ThrottleView {
    #[serde(flatten)]
    pub throttle: ShadowThrottle,
    /// Wire label of the reason.
    pub reason: &'static str,
    /// Whether the throttle is inside its active window right now.
    pub active: bool,
}

impl ThrottleView {
    pub fn at(throttle: ShadowThrottle, now: Timestamp) -> Self {
        let reason = throttle.reason().map(|r| r.label()).unwrap_or("unknown");
        let active = pulse_core::throttle::is_active(&throttle.window(), now);
        Self { throttle, reason, active }
    }
}
