// Candidate/job matching: heuristic scorer + 24h score cache.

pub mod cache;
pub mod scoring;

use std::collections::HashMap;

use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::CandidateRow;
use crate::models::job::JobRow;
use crate::models::matching::MatchRow;
use scoring::MatchScorer;

pub const DEFAULT_MATCH_LIMIT: usize = 20;
pub const MAX_MATCH_LIMIT: usize = 100;

#[derive(Debug, Serialize)]
pub struct JobMatch {
    pub job: JobRow,
    #[serde(rename = "match")]
    pub score: MatchRow,
}

#[derive(Debug, Serialize)]
pub struct CandidateMatch {
    pub candidate: CandidateRow,
    #[serde(rename = "match")]
    pub score: MatchRow,
}

pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_MATCH_LIMIT).clamp(1, MAX_MATCH_LIMIT)
}

/// Ranked public jobs for one candidate.
pub async fn recommended_jobs(
    pool: &PgPool,
    scorer: &dyn MatchScorer,
    ttl: Duration,
    candidate: &CandidateRow,
    limit: usize,
) -> Result<Vec<JobMatch>, AppError> {
    let jobs = crate::jobs::queries::all_public(pool).await?;
    let job_ids: Vec<Uuid> = jobs.iter().map(|j| j.id).collect();
    let cached = cache::load_for_candidate(pool, candidate.id, &job_ids).await?;

    let pairs: Vec<(&CandidateRow, &JobRow)> = jobs.iter().map(|j| (candidate, j)).collect();
    let (mut resolved, recomputed) = cache::resolve_pairs(&pairs, &cached, scorer, Utc::now(), ttl);
    debug!(
        candidate_id = %candidate.id,
        cached = resolved.len() - recomputed.len(),
        recomputed = recomputed.len(),
        "Resolved job matches"
    );
    cache::store(pool, &recomputed).await?;

    cache::rank(&mut resolved, limit, |r| r.job_id);
    let mut by_id: HashMap<Uuid, JobRow> = jobs.into_iter().map(|j| (j.id, j)).collect();
    Ok(resolved
        .into_iter()
        .filter_map(|score| by_id.remove(&score.job_id).map(|job| JobMatch { job, score }))
        .collect())
}

/// Ranked visible candidates for one job.
pub async fn top_candidates(
    pool: &PgPool,
    scorer: &dyn MatchScorer,
    ttl: Duration,
    job: &JobRow,
    limit: usize,
) -> Result<Vec<CandidateMatch>, AppError> {
    let candidates = crate::candidates::queries::all_visible(pool).await?;
    let candidate_ids: Vec<Uuid> = candidates.iter().map(|c| c.id).collect();
    let cached = cache::load_for_job(pool, job.id, &candidate_ids).await?;

    let pairs: Vec<(&CandidateRow, &JobRow)> = candidates.iter().map(|c| (c, job)).collect();
    let (mut resolved, recomputed) = cache::resolve_pairs(&pairs, &cached, scorer, Utc::now(), ttl);
    debug!(
        job_id = %job.id,
        cached = resolved.len() - recomputed.len(),
        recomputed = recomputed.len(),
        "Resolved candidate matches"
    );
    cache::store(pool, &recomputed).await?;

    cache::rank(&mut resolved, limit, |r| r.candidate_id);

    let mut by_id: HashMap<Uuid, CandidateRow> =
        candidates.into_iter().map(|c| (c.id, c)).collect();
    Ok(resolved
        .into_iter()
        .filter_map(|score| {
            by_id
                .remove(&score.candidate_id)
                .map(|candidate| CandidateMatch { candidate, score })
        })
        .collect())
}

/// Score for a single pair, going through the cache. Used when snapshotting
/// a score onto a new application.
pub async fn score_pair(
    pool: &PgPool,
    scorer: &dyn MatchScorer,
    ttl: Duration,
    candidate: &CandidateRow,
    job: &JobRow,
) -> Result<MatchRow, AppError> {
    let cached = cache::load_for_candidate(pool, candidate.id, &[job.id]).await?;
    let (mut resolved, recomputed) =
        cache::resolve_pairs(&[(candidate, job)], &cached, scorer, Utc::now(), ttl);
    cache::store(pool, &recomputed).await?;
    resolved
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("match resolution returned no row")))
}
