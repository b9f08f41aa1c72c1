//! Platform-wide counters for the admin dashboard.

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::PgPool;

use crate::applications::pipeline::ApplicationStatus;
use crate::employers::review::EmployerStatus;
use crate::jobs::workflow::JobStatus;

#[derive(Debug, Serialize, PartialEq)]
pub struct PlatformSummary {
    pub employers_by_status: BTreeMap<String, i64>,
    pub jobs_by_status: BTreeMap<String, i64>,
    pub applications_by_status: BTreeMap<String, i64>,
    pub candidates_total: i64,
    pub visible_candidates: i64,
    pub cached_matches: i64,
    pub average_match_score: Option<f64>,
}

/// Folds `GROUP BY status` rows into a map holding every known status,
/// zero-filled. Unknown statuses are kept as-is.
pub fn tally<'a>(
    known: impl IntoIterator<Item = &'a str>,
    rows: Vec<(String, i64)>,
) -> BTreeMap<String, i64> {
    let mut counts: BTreeMap<String, i64> = known.into_iter().map(|s| (s.to_string(), 0)).collect();
    for (status, count) in rows {
        *counts.entry(status).or_insert(0) += count;
    }
    counts
}

async fn counts_by_status(pool: &PgPool, table: &str) -> Result<Vec<(String, i64)>, sqlx::Error> {
    sqlx::query_as::<_, (String, i64)>(&format!(
        "SELECT status, COUNT(*) FROM {table} GROUP BY status"
    ))
    .fetch_all(pool)
    .await
}

pub async fn summary(pool: &PgPool) -> Result<PlatformSummary, sqlx::Error> {
    let employers = counts_by_status(pool, "employers").await?;
    let jobs = counts_by_status(pool, "jobs").await?;
    let applications = counts_by_status(pool, "applications").await?;

    let (candidates_total, visible_candidates): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COUNT(*) FILTER (WHERE visible) FROM candidates",
    )
    .fetch_one(pool)
    .await?;

    let (cached_matches, average_match_score): (i64, Option<f64>) =
        sqlx::query_as("SELECT COUNT(*), AVG(score)::FLOAT8 FROM matches")
            .fetch_one(pool)
            .await?;

    Ok(PlatformSummary {
        employers_by_status: tally(EmployerStatus::ALL.iter().map(|s| s.as_str()), employers),
        jobs_by_status: tally(JobStatus::ALL.iter().map(|s| s.as_str()), jobs),
        applications_by_status: tally(
            ApplicationStatus::ALL.iter().map(|s| s.as_str()),
            applications,
        ),
        candidates_total,
        visible_candidates,
        cached_matches,
        average_match_score: average_match_score.map(|avg| (avg * 10.0).round() / 10.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_zero_fills_known_statuses() {
        let counts = tally(
            JobStatus::ALL.iter().map(|s| s.as_str()),
            vec![("LIVE".to_string(), 4), ("DRAFT".to_string(), 2)],
        );
        assert_eq!(counts.len(), JobStatus::ALL.len());
        assert_eq!(counts["LIVE"], 4);
        assert_eq!(counts["DRAFT"], 2);
        assert_eq!(counts["EXPIRED"], 0);
    }

    #[test]
    fn test_tally_keeps_unknown_status() {
        let counts = tally(["PENDING"], vec![("LEGACY".to_string(), 1)]);
        assert_eq!(counts["PENDING"], 0);
        assert_eq!(counts["LEGACY"], 1);
    }
}
