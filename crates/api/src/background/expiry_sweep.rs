//! Periodic expiry sweep over proximity artifacts.
//!
//! Each cycle tombstones artifacts past `expires_at` and hard-deletes
//! tombstones older than the grace window. The sweep is a singleton across
//! instances: a Postgres advisory lock guards each cycle, and a missed lock
//! just skips the cycle — the status-guarded UPDATE is idempotent, so the
//! next holder picks up whatever was due.

use std::time::Duration;

use chrono::Utc;
use pulse_db::repositories::ArtifactRepo;
use pulse_db::DbPool;
use tokio_util::sync::CancellationToken;

/// Advisory lock key for the sweep singleton ("pulse" in hex, tag 01).
/// Per-user location locks use raw user ids, far below this range.
const SWEEP_LOCK_KEY: i64 = 0x7075_6C73_6501;

/// Run the expiry sweep loop until `cancel` is triggered.
pub async fn run(pool: DbPool, interval_secs: u64, grace_days: i64, cancel: CancellationToken) {
    tracing::info!(interval_secs, grace_days, "Expiry sweep started");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Expiry sweep stopping");
                break;
            }
            _ = interval.tick() => {
                if let Err(e) = sweep_cycle(&pool, grace_days).await {
                    // Transient failures retry on the next tick; the guarded
                    // UPDATE leaves half-swept state consistent.
                    tracing::error!(error = %e, "Expiry sweep cycle failed");
                }
            }
        }
    }
}

/// One guarded sweep cycle. Returns without work when another instance
/// holds the lock.
async fn sweep_cycle(pool: &DbPool, grace_days: i64) -> Result<(), sqlx::Error> {
    let mut conn = pool.acquire().await?;

    let locked: bool = sqlx::query_scalar("SELECT pg_try_advisory_lock($1)")
        .bind(SWEEP_LOCK_KEY)
        .fetch_one(&mut *conn)
        .await?;
    if !locked {
        tracing::debug!("Expiry sweep: another instance holds the lock");
        return Ok(());
    }

    // Hold the lock for the whole cycle; release before returning.
    let result = async {
        let now = Utc::now();

        let expired = ArtifactRepo::expire_due(pool, now).await?;
        if expired > 0 {
            tracing::info!(expired, "Expiry sweep: artifacts tombstoned");
        } else {
            tracing::debug!("Expiry sweep: nothing due");
        }

        let cutoff = now - chrono::Duration::days(grace_days);
        let purged = ArtifactRepo::purge_tombstones(pool, cutoff).await?;
        if purged > 0 {
            tracing::info!(purged, "Expiry sweep: tombstones purged after grace window");
        }

        Ok::<(), sqlx::Error>(())
    }
    .await;

    let unlock = sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(SWEEP_LOCK_KEY)
        .execute(&mut *conn)
        .await;
    if let Err(e) = unlock {
        // The lock dies with the connection either way; drop it.
        tracing::warn!(error = %e, "Expiry sweep: unlock failed, dropping connection");
    }

    result
}
