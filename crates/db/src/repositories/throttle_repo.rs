//! Repository for the `shadow_throttles` table.
//!
//! Throttles are never deleted; lifting one sets its expiry to the lift
//! instant so the record survives as moderation history. A throttle is
//! active when `started_at <= now` and `expires_at` is NULL or in the
//! future.

use pulse_core::status::ThrottleReason;
use pulse_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::throttle::{ShadowThrottle, UserReduction};

/// Column list for `shadow_throttles` queries.
const COLUMNS: &str = "\
    id, user_id, reason_id, severity, visibility_reduction, \
    started_at, expires_at, notes, created_by, created_at";

/// Provides CRUD and aggregation for shadow throttles.
pub struct ThrottleRepo;

impl ThrottleRepo {
    /// Apply a throttle starting at `started_at`.
    ///
    /// `created_by` is `None` for automatic (flag- or spoof-driven)
    /// throttles, the moderator's id otherwise.
    #[allow(clippy::too_many_arguments)]
    pub async fn apply(
        pool: &PgPool,
        user_id: DbId,
        reason: ThrottleReason,
        severity: i16,
        visibility_reduction: f64,
        started_at: Timestamp,
        expires_at: Option<Timestamp>,
        notes: Option<&str>,
        created_by: Option<DbId>,
    ) -> Result<ShadowThrottle, sqlx::Error> {
        let query = format!(
            "INSERT INTO shadow_throttles \
             (user_id, reason_id, severity, visibility_reduction, started_at, \
              expires_at, notes, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ShadowThrottle>(&query)
            .bind(user_id)
            .bind(reason.id())
            .bind(severity)
            .bind(visibility_reduction)
            .bind(started_at)
            .bind(expires_at)
            .bind(notes)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Every throttle ever applied to a user, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<ShadowThrottle>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM shadow_throttles \
             WHERE user_id = $1 ORDER BY started_at DESC"
        );
        sqlx::query_as::<_, ShadowThrottle>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Effective reduction per user: MAX over active throttles, one row per
    /// user that has any. Users absent from the result have reduction 0.
    pub async fn effective_reductions(
        pool: &PgPool,
        user_ids: &[DbId],
        now: Timestamp,
    ) -> Result<Vec<UserReduction>, sqlx::Error> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, UserReduction>(
            "SELECT user_id, MAX(visibility_reduction) AS reduction \
             FROM shadow_throttles \
             WHERE user_id = ANY($1) \
               AND started_at <= $2 \
               AND (expires_at IS NULL OR expires_at > $2) \
             GROUP BY user_id",
        )
        .bind(user_ids)
        .bind(now)
        .fetch_all(pool)
        .await
    }

    /// Highest active severity for a user and reason. Used by the
    /// auto-throttle ladder to avoid stacking a weaker tier on a stronger
    /// one.
    pub async fn max_active_severity(
        pool: &PgPool,
        user_id: DbId,
        reason: ThrottleReason,
        now: Timestamp,
    ) -> Result<Option<i16>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<i16>>(
            "SELECT MAX(severity) FROM shadow_throttles \
             WHERE user_id = $1 AND reason_id = $2 \
               AND started_at <= $3 \
               AND (expires_at IS NULL OR expires_at > $3)",
        )
        .bind(user_id)
        .bind(reason.id())
        .bind(now)
        .fetch_one(pool)
        .await
    }

    /// Lift an active throttle by expiring it at `now`. Returns `None` when
    /// the throttle does not exist or already expired.
    pub async fn lift(
        pool: &PgPool,
        id: DbId,
        now: Timestamp,
    ) -> Result<Option<ShadowThrottle>, sqlx::Error> {
        let query = format!(
            "UPDATE shadow_throttles SET expires_at = $2 \
             WHERE id = $1 AND (expires_at IS NULL OR expires_at > $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ShadowThrottle>(&query)
            .bind(id)
            .bind(now)
            .fetch_optional(pool)
            .await
    }
}
