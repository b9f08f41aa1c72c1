//! Match cache. Scores are persisted in `matches` and reused until they go
//! stale, then recomputed and written back with an upsert.
//!
//! A cached row is fresh when it is younger than the TTL and was computed after
//! the last update to both the candidate profile and the job.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::matching::scoring::{MatchBreakdown, MatchScorer};
use crate::models::candidate::CandidateRow;
use crate::models::job::JobRow;
use crate::models::matching::MatchRow;

pub fn is_fresh(
    row: &MatchRow,
    candidate_updated_at: DateTime<Utc>,
    job_updated_at: DateTime<Utc>,
    now: DateTime<Utc>,
    ttl: Duration,
) -> bool {
    now - row.computed_at < ttl
        && row.computed_at >= candidate_updated_at
        && row.computed_at >= job_updated_at
}

pub fn to_row(
    candidate_id: Uuid,
    job_id: Uuid,
    breakdown: MatchBreakdown,
    computed_at: DateTime<Utc>,
) -> MatchRow {
    MatchRow {
        candidate_id,
        job_id,
        score: breakdown.total(),
        level_points: breakdown.level_points,
        service_line_points: breakdown.service_line_points,
        location_points: breakdown.location_points,
        compensation_points: breakdown.compensation_points,
        reasons: breakdown.reasons,
        computed_at,
    }
}

/// Resolves scores for every (candidate, job) pair, reusing fresh cache rows
/// and recomputing the rest. Returns the resolved rows and the recomputed
/// subset that must be written back.
pub fn resolve_pairs(
    pairs: &[(&CandidateRow, &JobRow)],
    cached: &HashMap<(Uuid, Uuid), MatchRow>,
    scorer: &dyn MatchScorer,
    now: DateTime<Utc>,
    ttl: Duration,
) -> (Vec<MatchRow>, Vec<MatchRow>) {
    let mut resolved = Vec::with_capacity(pairs.len());
    let mut recomputed = Vec::new();

    for (candidate, job) in pairs {
        match cached.get(&(candidate.id, job.id)) {
            Some(row) if is_fresh(row, candidate.updated_at, job.updated_at, now, ttl) => {
                resolved.push(row.clone());
            }
            _ => {
                let row = to_row(candidate.id, job.id, scorer.score(candidate, job), now);
                recomputed.push(row.clone());
                resolved.push(row);
            }
        }
    }

    (resolved, recomputed)
}

/// Drops zero scores, then orders highest score first with ties broken by
/// `tie_key` (the id of the ranked side) and keeps the top `limit`.
pub fn rank<F>(rows: &mut Vec<MatchRow>, limit: usize, tie_key: F)
where
    F: Fn(&MatchRow) -> Uuid,
{
    rows.retain(|r| r.score > 0);
    rows.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| tie_key(a).cmp(&tie_key(b)))
    });
    rows.truncate(limit);
}

// ────────────────────────────────────────────────────────────────────────────
// Persistence
// ────────────────────────────────────────────────────────────────────────────

pub async fn load_for_candidate(
    pool: &PgPool,
    candidate_id: Uuid,
    job_ids: &[Uuid],
) -> Result<HashMap<(Uuid, Uuid), MatchRow>, sqlx::Error> {
    let rows = sqlx::query_as::<_, MatchRow>(
        "SELECT * FROM matches WHERE candidate_id = $1 AND job_id = ANY($2)",
    )
    .bind(candidate_id)
    .bind(job_ids)
    .fetch_all(pool)
    .await?;
    Ok(index(rows))
}

pub async fn load_for_job(
    pool: &PgPool,
    job_id: Uuid,
    candidate_ids: &[Uuid],
) -> Result<HashMap<(Uuid, Uuid), MatchRow>, sqlx::Error> {
    let rows = sqlx::query_as::<_, MatchRow>(
        "SELECT * FROM matches WHERE job_id = $1 AND candidate_id = ANY($2)",
    )
    .bind(job_id)
    .bind(candidate_ids)
    .fetch_all(pool)
    .await?;
    Ok(index(rows))
}

fn index(rows: Vec<MatchRow>) -> HashMap<(Uuid, Uuid), MatchRow> {
    rows.into_iter()
        .map(|r| ((r.candidate_id, r.job_id), r))
        .collect()
}

async fn upsert(tx: &mut Transaction<'_, Postgres>, row: &MatchRow) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO matches
            (candidate_id, job_id, score, level_points, service_line_points,
             location_points, compensation_points, reasons, computed_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (candidate_id, job_id) DO UPDATE SET
            score = EXCLUDED.score,
            level_points = EXCLUDED.level_points,
            service_line_points = EXCLUDED.service_line_points,
            location_points = EXCLUDED.location_points,
            compensation_points = EXCLUDED.compensation_points,
            reasons = EXCLUDED.reasons,
            computed_at = EXCLUDED.computed_at
        "#,
    )
    .bind(row.candidate_id)
    .bind(row.job_id)
    .bind(row.score)
    .bind(row.level_points)
    .bind(row.service_line_points)
    .bind(row.location_points)
    .bind(row.compensation_points)
    .bind(&row.reasons)
    .bind(row.computed_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Rows sorted by primary key, so concurrent writers lock them in the same order.
fn write_order(rows: &[MatchRow]) -> Vec<&MatchRow> {
    let mut ordered: Vec<&MatchRow> = rows.iter().collect();
    ordered.sort_by_key(|r| (r.candidate_id, r.job_id));
    ordered
}

/// Writes recomputed rows back in a single transaction.
pub async fn store(pool: &PgPool, rows: &[MatchRow]) -> Result<(), sqlx::Error> {
    if rows.is_empty() {
        return Ok(());
    }
    let mut tx = pool.begin().await?;
    for row in write_order(rows) {
        upsert(&mut tx, row).await?;
    }
    tx.commit().await?;
    debug!("Upserted {} match rows", rows.len());
    Ok(())
}

/// Deletes cache rows older than the TTL.
pub async fn prune_stale(pool: &PgPool, ttl: Duration) -> Result<u64, sqlx::Error> {
    let cutoff = Utc::now() - ttl;
    let result = sqlx::query("DELETE FROM matches WHERE computed_at < $1")
        .bind(cutoff)
        .execute(pool)
        .await?;
    if result.rows_affected() > 0 {
        info!("Pruned {} stale match rows", result.rows_affected());
    }
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::scoring::tests::{make_candidate, make_job};
    use crate::matching::scoring::HeuristicMatchScorer;

    fn cached_row(candidate: &CandidateRow, job: &JobRow, score: i32, at: DateTime<Utc>) -> MatchRow {
        MatchRow {
            candidate_id: candidate.id,
            job_id: job.id,
            score,
            level_points: 0,
            service_line_points: 0,
            location_points: 0,
            compensation_points: 0,
            reasons: vec![],
            computed_at: at,
        }
    }

    #[test]
    fn test_fresh_within_ttl() {
        let now = Utc::now();
        let mut candidate = make_candidate();
        let mut job = make_job();
        candidate.updated_at = now - Duration::hours(5);
        job.updated_at = now - Duration::hours(5);
        let row = cached_row(&candidate, &job, 42, now - Duration::hours(1));
        assert!(is_fresh(&row, candidate.updated_at, job.updated_at, now, Duration::hours(24)));
    }

    #[test]
    fn test_stale_after_ttl() {
        let now = Utc::now();
        let mut candidate = make_candidate();
        let mut job = make_job();
        candidate.updated_at = now - Duration::days(3);
        job.updated_at = now - Duration::days(3);
        let row = cached_row(&candidate, &job, 42, now - Duration::hours(25));
        assert!(!is_fresh(&row, candidate.updated_at, job.updated_at, now, Duration::hours(24)));
    }

    #[test]
    fn test_stale_after_profile_update() {
        let now = Utc::now();
        let mut candidate = make_candidate();
        let mut job = make_job();
        job.updated_at = now - Duration::days(1);
        candidate.updated_at = now - Duration::minutes(5);
        let row = cached_row(&candidate, &job, 42, now - Duration::hours(1));
        assert!(!is_fresh(&row, candidate.updated_at, job.updated_at, now, Duration::hours(24)));
    }

    #[test]
    fn test_resolve_reuses_fresh_and_recomputes_missing() {
        let now = Utc::now();
        let mut candidate = make_candidate();
        candidate.updated_at = now - Duration::days(2);
        let mut cached_job = make_job();
        cached_job.updated_at = now - Duration::days(2);
        let mut new_job = make_job();
        new_job.updated_at = now - Duration::days(2);

        let mut cached = HashMap::new();
        cached.insert(
            (candidate.id, cached_job.id),
            cached_row(&candidate, &cached_job, 7, now - Duration::hours(2)),
        );

        let pairs = vec![(&candidate, &cached_job), (&candidate, &new_job)];
        let (resolved, recomputed) =
            resolve_pairs(&pairs, &cached, &HeuristicMatchScorer, now, Duration::hours(24));

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].score, 7);
        assert_eq!(recomputed.len(), 1);
        assert_eq!(recomputed[0].job_id, new_job.id);
        assert_eq!(recomputed[0].score, 100);
        assert_eq!(recomputed[0].computed_at, now);
    }

    #[test]
    fn test_resolve_recomputes_stale_rows() {
        let now = Utc::now();
        let candidate = make_candidate();
        let job = make_job();
        let mut cached = HashMap::new();
        cached.insert(
            (candidate.id, job.id),
            cached_row(&candidate, &job, 7, now - Duration::hours(30)),
        );
        let (resolved, recomputed) = resolve_pairs(
            &[(&candidate, &job)],
            &cached,
            &HeuristicMatchScorer,
            now,
            Duration::hours(24),
        );
        assert_eq!(recomputed.len(), 1);
        assert_eq!(resolved[0].score, 100);
    }

    #[test]
    fn test_rank_drops_zero_and_orders_desc() {
        let candidate = make_candidate();
        let now = Utc::now();
        let mut rows: Vec<MatchRow> = [30, 0, 90, 60]
            .into_iter()
            .map(|score| cached_row(&candidate, &make_job(), score, now))
            .collect();
        rank(&mut rows, 2, |r| r.job_id);
        let scores: Vec<i32> = rows.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![90, 60]);
    }

    #[test]
    fn test_rank_breaks_ties_by_job_id() {
        let candidate = make_candidate();
        let now = Utc::now();
        let mut rows: Vec<MatchRow> = (0..4)
            .map(|_| cached_row(&candidate, &make_job(), 55, now))
            .collect();
        rows.push(cached_row(&candidate, &make_job(), 80, now));
        let mut tied: Vec<Uuid> = rows.iter().filter(|r| r.score == 55).map(|r| r.job_id).collect();
        tied.sort();

        rank(&mut rows, 10, |r| r.job_id);
        assert_eq!(rows[0].score, 80);
        let ranked: Vec<Uuid> = rows[1..].iter().map(|r| r.job_id).collect();
        assert_eq!(ranked, tied);
    }

    #[test]
    fn test_rank_breaks_ties_by_candidate_id() {
        let job = make_job();
        let now = Utc::now();
        let mut rows: Vec<MatchRow> = (0..4)
            .map(|_| cached_row(&make_candidate(), &job, 40, now))
            .collect();
        let mut tied: Vec<Uuid> = rows.iter().map(|r| r.candidate_id).collect();
        tied.sort();

        rank(&mut rows, 3, |r| r.candidate_id);
        let ranked: Vec<Uuid> = rows.iter().map(|r| r.candidate_id).collect();
        assert_eq!(ranked, tied[..3].to_vec());
    }

    #[test]
    fn test_write_order_is_primary_key_order() {
        let now = Utc::now();
        let candidates = [make_candidate(), make_candidate()];
        let jobs = [make_job(), make_job()];
        let rows: Vec<MatchRow> = jobs
            .iter()
            .flat_map(|j| candidates.iter().map(move |c| cached_row(c, j, 10, now)))
            .collect();

        let keys: Vec<(Uuid, Uuid)> = write_order(&rows)
            .iter()
            .map(|r| (r.candidate_id, r.job_id))
            .collect();
        let mut expected = keys.clone();
        expected.sort();
        assert_eq!(keys, expected);
        assert_eq!(keys.len(), 4);
    }
}
