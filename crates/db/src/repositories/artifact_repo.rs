//! Repository for the `proximity_artifacts` table.
//!
//! Status transitions are guarded in SQL so concurrent moderation, owner
//! removal, and the expiry sweep cannot resurrect a terminal artifact.

use pulse_core::artifact::FLAG_ESCALATION_THRESHOLD;
use pulse_core::geo::{BoundingBox, GeoPoint};
use pulse_core::geo_index::refine_and_sort;
use pulse_core::status::{ArtifactKind, ModerationStatus};
use pulse_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::artifact::Artifact;

/// Column list for `proximity_artifacts` queries.
const COLUMNS: &str = "\
    id, owner_id, kind_id, content, latitude, longitude, \
    visibility_radius_m, moderation_status_id, flag_count, \
    expires_at, created_at, updated_at";

/// Cap on bounding-box candidates fetched per nearby query, newest first.
/// Dense areas truncate at this depth before haversine refinement.
const CANDIDATE_LIMIT: i64 = 500;

/// Provides CRUD and geo queries for proximity artifacts.
pub struct ArtifactRepo;

impl ArtifactRepo {
    /// Insert a new clean artifact.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        pool: &PgPool,
        owner_id: DbId,
        kind: ArtifactKind,
        content: &str,
        location: GeoPoint,
        visibility_radius_m: i32,
        expires_at: Timestamp,
    ) -> Result<Artifact, sqlx::Error> {
        let query = format!(
            "INSERT INTO proximity_artifacts \
             (owner_id, kind_id, content, latitude, longitude, visibility_radius_m, \
              moderation_status_id, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Artifact>(&query)
            .bind(owner_id)
            .bind(kind.id())
            .bind(content)
            .bind(location.latitude)
            .bind(location.longitude)
            .bind(visibility_radius_m)
            .bind(ModerationStatus::Clean.id())
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Artifact>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM proximity_artifacts WHERE id = $1");
        sqlx::query_as::<_, Artifact>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Artifacts within `radius_m` of `center`, distance ascending, ties
    /// newest-first.
    ///
    /// Terminal and past-expiry artifacts are excluded in SQL — an artifact
    /// past `expires_at` never surfaces even if the sweep has not yet
    /// tombstoned it.
    pub async fn nearby(
        pool: &PgPool,
        center: GeoPoint,
        radius_m: f64,
        kind: Option<ArtifactKind>,
        now: Timestamp,
    ) -> Result<Vec<(Artifact, f64)>, sqlx::Error> {
        let bbox = BoundingBox::around(center, radius_m);

        let mut query = format!(
            "SELECT {COLUMNS} FROM proximity_artifacts \
             WHERE moderation_status_id NOT IN ($1, $2) \
               AND expires_at > $3 \
               AND latitude BETWEEN $4 AND $5 \
               AND longitude BETWEEN $6 AND $7"
        );
        if kind.is_some() {
            query.push_str(" AND kind_id = $8");
        }
        query.push_str(" ORDER BY created_at DESC LIMIT ");
        query.push_str(&CANDIDATE_LIMIT.to_string());

        let mut q = sqlx::query_as::<_, Artifact>(&query)
            .bind(ModerationStatus::Removed.id())
            .bind(ModerationStatus::Expired.id())
            .bind(now)
            .bind(bbox.min_lat)
            .bind(bbox.max_lat)
            .bind(bbox.min_lng)
            .bind(bbox.max_lng);
        if let Some(kind) = kind {
            q = q.bind(kind.id());
        }

        let candidates = q.fetch_all(pool).await?;
        Ok(refine_and_sort(candidates, center, radius_m))
    }

    /// Artifacts of `kind` created by `owner_id` since `since` (daily cap
    /// accounting).
    pub async fn count_created_since(
        pool: &PgPool,
        owner_id: DbId,
        kind: ArtifactKind,
        since: Timestamp,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM proximity_artifacts \
             WHERE owner_id = $1 AND kind_id = $2 AND created_at >= $3",
        )
        .bind(owner_id)
        .bind(kind.id())
        .bind(since)
        .fetch_one(pool)
        .await
    }

    /// Record one flag. Escalates a clean artifact to `Flagged` once the
    /// count reaches the threshold, in the same statement, so concurrent
    /// flags cannot race past the escalation.
    ///
    /// Returns `None` for terminal artifacts.
    pub async fn record_flag(pool: &PgPool, id: DbId) -> Result<Option<Artifact>, sqlx::Error> {
        let query = format!(
            "UPDATE proximity_artifacts \
             SET flag_count = flag_count + 1, \
                 moderation_status_id = CASE \
                     WHEN flag_count + 1 >= $2 AND moderation_status_id = $3 THEN $4 \
                     ELSE moderation_status_id \
                 END, \
                 updated_at = NOW() \
             WHERE id = $1 AND moderation_status_id NOT IN ($5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Artifact>(&query)
            .bind(id)
            .bind(FLAG_ESCALATION_THRESHOLD)
            .bind(ModerationStatus::Clean.id())
            .bind(ModerationStatus::Flagged.id())
            .bind(ModerationStatus::Removed.id())
            .bind(ModerationStatus::Expired.id())
            .fetch_optional(pool)
            .await
    }

    /// Total flags across an owner's artifacts created since `since`.
    /// Feeds the auto-throttle escalation ladder.
    pub async fn owner_flag_total(
        pool: &PgPool,
        owner_id: DbId,
        since: Timestamp,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(flag_count), 0) FROM proximity_artifacts \
             WHERE owner_id = $1 AND created_at >= $2",
        )
        .bind(owner_id)
        .bind(since)
        .fetch_one(pool)
        .await
    }

    /// Moderator status transition. Refuses to touch terminal artifacts.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: ModerationStatus,
    ) -> Result<Option<Artifact>, sqlx::Error> {
        let query = format!(
            "UPDATE proximity_artifacts \
             SET moderation_status_id = $2, updated_at = NOW() \
             WHERE id = $1 AND moderation_status_id NOT IN ($3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Artifact>(&query)
            .bind(id)
            .bind(status.id())
            .bind(ModerationStatus::Removed.id())
            .bind(ModerationStatus::Expired.id())
            .fetch_optional(pool)
            .await
    }

    /// Owner soft-delete: terminal `Removed`, owner check in SQL.
    pub async fn remove_by_owner(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
    ) -> Result<Option<Artifact>, sqlx::Error> {
        let query = format!(
            "UPDATE proximity_artifacts \
             SET moderation_status_id = $3, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 AND moderation_status_id NOT IN ($3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Artifact>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(ModerationStatus::Removed.id())
            .bind(ModerationStatus::Expired.id())
            .fetch_optional(pool)
            .await
    }

    /// Tombstone every artifact past its expiry. Set-based and idempotent:
    /// already-terminal rows are excluded, so a second sweep over the same
    /// instant affects zero rows.
    pub async fn expire_due(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE proximity_artifacts \
             SET moderation_status_id = $2, updated_at = NOW() \
             WHERE expires_at <= $1 AND moderation_status_id NOT IN ($2, $3)",
        )
        .bind(now)
        .bind(ModerationStatus::Expired.id())
        .bind(ModerationStatus::Removed.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Hard-delete tombstones whose grace window has elapsed.
    pub async fn purge_tombstones(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM proximity_artifacts \
             WHERE moderation_status_id IN ($1, $2) AND updated_at <= $3",
        )
        .bind(ModerationStatus::Removed.id())
        .bind(ModerationStatus::Expired.id())
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
