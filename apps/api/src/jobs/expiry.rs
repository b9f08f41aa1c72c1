//! Background sweep: expires LIVE jobs past `expires_at` and prunes the match cache.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::admin::audit::{self, AuditEntry, EntityType};
use crate::jobs::workflow::{JobEvent, JobStatus};
use crate::matching::cache;

/// Expires due jobs in one transaction, auditing each with a system actor.
pub async fn expire_due_jobs(pool: &PgPool) -> Result<usize, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let expired = crate::jobs::queries::expire_due(&mut *tx, Utc::now()).await?;
    for job_id in &expired {
        audit::record(
            &mut *tx,
            &AuditEntry::new(None, EntityType::Job, *job_id, JobEvent::Expire.audit_action())
                .transition(JobStatus::Live.as_str(), JobStatus::Expired.as_str(), None),
        )
        .await?;
    }
    tx.commit().await?;

    if !expired.is_empty() {
        info!(count = expired.len(), "Expired job listings");
    }
    Ok(expired.len())
}

pub async fn sweep_once(pool: &PgPool, match_ttl: chrono::Duration) {
    if let Err(e) = expire_due_jobs(pool).await {
        error!("Job expiry sweep failed: {e}");
    }
    if let Err(e) = cache::prune_stale(pool, match_ttl).await {
        error!("Match cache prune failed: {e}");
    }
}

/// Spawns the periodic sweeper. The first sweep runs immediately.
pub fn spawn_sweeper(
    pool: PgPool,
    interval: Duration,
    match_ttl: chrono::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sweep_once(&pool, match_ttl).await;
        }
    })
}

/// Waits on the sweeper task and logs when it stops, since expiry then halts.
/// Returns the join failure, if the task panicked or was cancelled.
pub async fn watch_sweeper(handle: JoinHandle<()>) -> Option<String> {
    match handle.await {
        Ok(()) => {
            error!("Sweeper exited; job expiry has stopped");
            None
        }
        Err(e) => {
            error!("Sweeper task failed, job expiry has stopped: {e}");
            Some(e.to_string())
        }
    }
}
