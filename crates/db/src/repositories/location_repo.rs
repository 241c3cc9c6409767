//! Repository for the `location_points` table (append-only log per user).

use pulse_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::location::{LocationPoint, RecordLocation};

/// Column list for `location_points` queries.
const COLUMNS: &str = "\
    id, user_id, latitude, longitude, accuracy_m, recorded_at, created_at";

/// Provides append and latest-point access to the location log.
pub struct LocationRepo;

impl LocationRepo {
    /// Append a location point and return `(previous latest, new point)`.
    ///
    /// Runs in a transaction holding `pg_advisory_xact_lock(user_id)`:
    /// concurrent updates for the same user serialize, so the previous
    /// point handed to the spoof detector is never a torn read. The lock
    /// releases with the transaction.
    pub async fn append(
        pool: &PgPool,
        user_id: DbId,
        input: &RecordLocation,
        recorded_at: Timestamp,
    ) -> Result<(Option<LocationPoint>, LocationPoint), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let previous_query =
            format!("SELECT {COLUMNS} FROM location_points WHERE user_id = $1 ORDER BY recorded_at DESC LIMIT 1");
        let previous = sqlx::query_as::<_, LocationPoint>(&previous_query)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

        let insert_query = format!(
            "INSERT INTO location_points (user_id, latitude, longitude, accuracy_m, recorded_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, LocationPoint>(&insert_query)
            .bind(user_id)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(input.accuracy_m)
            .bind(recorded_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((previous, inserted))
    }

    /// The user's most recent location point, if any.
    pub async fn latest(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<LocationPoint>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM location_points \
             WHERE user_id = $1 ORDER BY recorded_at DESC LIMIT 1"
        );
        sqlx::query_as::<_, LocationPoint>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
