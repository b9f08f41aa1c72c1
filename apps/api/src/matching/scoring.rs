//! Match scoring: a pluggable, trait-based scorer for a candidate against a job.
//!
//! Default: `HeuristicMatchScorer` (fixed points per overlapping dimension,
//! deterministic, no I/O).
//!
//! `AppState` holds an `Arc<dyn MatchScorer>`, chosen at startup.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::candidate::CandidateRow;
use crate::models::job::JobRow;
use crate::models::level::ExecLevel;

pub const LEVEL_POINTS: i32 = 40;
pub const ADJACENT_LEVEL_POINTS: i32 = 15;
pub const SERVICE_LINE_POINTS: i32 = 30;
pub const LOCATION_POINTS: i32 = 20;
pub const RELOCATION_POINTS: i32 = 10;
pub const COMPENSATION_POINTS: i32 = 10;

// ────────────────────────────────────────────────────────────────────────────
// Output data model
// ────────────────────────────────────────────────────────────────────────────

/// Per-dimension points plus the reasons they were awarded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchBreakdown {
    pub level_points: i32,
    pub service_line_points: i32,
    pub location_points: i32,
    pub compensation_points: i32,
    pub reasons: Vec<String>,
}

impl MatchBreakdown {
    /// 0 – 100
    pub fn total(&self) -> i32 {
        self.level_points + self.service_line_points + self.location_points + self.compensation_points
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap scoring backends without touching the cache or
/// handlers. Carried in `AppState` as `Arc<dyn MatchScorer>`.
pub trait MatchScorer: Send + Sync {
    fn score(&self, candidate: &CandidateRow, job: &JobRow) -> MatchBreakdown;
}

pub struct HeuristicMatchScorer;

impl MatchScorer for HeuristicMatchScorer {
    fn score(&self, candidate: &CandidateRow, job: &JobRow) -> MatchBreakdown {
        let mut breakdown = MatchBreakdown::default();
        score_level(candidate, job, &mut breakdown);
        score_service_lines(candidate, job, &mut breakdown);
        score_location(candidate, job, &mut breakdown);
        score_compensation(candidate, job, &mut breakdown);
        breakdown
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Dimensions
// ────────────────────────────────────────────────────────────────────────────

fn score_level(candidate: &CandidateRow, job: &JobRow, out: &mut MatchBreakdown) {
    let Ok(job_level) = ExecLevel::from_str(&job.level) else {
        return;
    };
    let targets: Vec<ExecLevel> = candidate
        .target_levels
        .iter()
        .filter_map(|l| l.parse().ok())
        .collect();

    if targets.contains(&job_level) {
        out.level_points = LEVEL_POINTS;
        out.reasons.push(format!("Targets {job_level} roles"));
    } else if targets.iter().any(|t| t.is_adjacent(job_level)) {
        out.level_points = ADJACENT_LEVEL_POINTS;
        out.reasons
            .push(format!("Targets a level adjacent to {job_level}"));
    }
}

fn score_service_lines(candidate: &CandidateRow, job: &JobRow, out: &mut MatchBreakdown) {
    let shared: Vec<&str> = job
        .service_lines
        .iter()
        .filter(|line| {
            candidate
                .service_lines
                .iter()
                .any(|c| c.eq_ignore_ascii_case(line))
        })
        .map(String::as_str)
        .collect();

    if !shared.is_empty() {
        out.service_line_points = SERVICE_LINE_POINTS;
        out.reasons
            .push(format!("Service line experience: {}", shared.join(", ")));
    }
}

fn locations_match(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a))
}

fn score_location(candidate: &CandidateRow, job: &JobRow, out: &mut MatchBreakdown) {
    if job.remote && candidate.open_to_remote {
        out.location_points = LOCATION_POINTS;
        out.reasons.push("Open to remote work".to_string());
        return;
    }

    if let Some(location) = job.location.as_deref() {
        if candidate
            .preferred_locations
            .iter()
            .any(|pref| locations_match(pref, location))
        {
            out.location_points = LOCATION_POINTS;
            out.reasons.push(format!("Prefers {location}"));
            return;
        }
    }

    if candidate.willing_to_relocate && !job.remote {
        out.location_points = RELOCATION_POINTS;
        out.reasons.push("Willing to relocate".to_string());
    }
}

fn score_compensation(candidate: &CandidateRow, job: &JobRow, out: &mut MatchBreakdown) {
    let Some(ceiling) = job.compensation_max.or(job.compensation_min) else {
        return;
    };
    match candidate.desired_compensation {
        None => {
            out.compensation_points = COMPENSATION_POINTS;
            out.reasons
                .push("No compensation expectation set".to_string());
        }
        Some(desired) if ceiling >= desired => {
            out.compensation_points = COMPENSATION_POINTS;
            out.reasons
                .push("Compensation meets expectations".to_string());
        }
        Some(_) => {}
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    pub(crate) fn make_candidate() -> CandidateRow {
        CandidateRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            full_name: "Dana Whitfield".to_string(),
            headline: Some("Operations leader".to_string()),
            current_title: Some("VP Operations".to_string()),
            years_experience: 18,
            target_levels: vec!["VICE_PRESIDENT".to_string()],
            service_lines: vec!["cardiology".to_string(), "oncology".to_string()],
            preferred_locations: vec!["Boston, MA".to_string()],
            open_to_remote: false,
            willing_to_relocate: false,
            desired_compensation: Some(300_000),
            resume_s3_key: None,
            resume_text: None,
            visible: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub(crate) fn make_job() -> JobRow {
        JobRow {
            id: Uuid::new_v4(),
            employer_id: Uuid::new_v4(),
            title: "Vice President, Cardiovascular Services".to_string(),
            level: "VICE_PRESIDENT".to_string(),
            service_lines: vec!["cardiology".to_string()],
            location: Some("Boston".to_string()),
            remote: false,
            compensation_min: Some(280_000),
            compensation_max: Some(340_000),
            description: "Lead the cardiovascular service line.".to_string(),
            status: "LIVE".to_string(),
            rejection_reason: None,
            published_at: Some(Utc::now()),
            expires_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_perfect_match_scores_100() {
        let breakdown = HeuristicMatchScorer.score(&make_candidate(), &make_job());
        assert_eq!(breakdown.total(), 100);
        assert_eq!(breakdown.reasons.len(), 4);
    }

    #[test]
    fn test_adjacent_level_partial_credit() {
        let mut job = make_job();
        job.level = "SENIOR_VICE_PRESIDENT".to_string();
        let breakdown = HeuristicMatchScorer.score(&make_candidate(), &job);
        assert_eq!(breakdown.level_points, ADJACENT_LEVEL_POINTS);
    }

    #[test]
    fn test_distant_level_scores_zero() {
        let mut job = make_job();
        job.level = "MANAGER".to_string();
        let breakdown = HeuristicMatchScorer.score(&make_candidate(), &job);
        assert_eq!(breakdown.level_points, 0);
    }

    #[test]
    fn test_service_line_case_insensitive() {
        let mut job = make_job();
        job.service_lines = vec!["Oncology".to_string(), "radiology".to_string()];
        let breakdown = HeuristicMatchScorer.score(&make_candidate(), &job);
        assert_eq!(breakdown.service_line_points, SERVICE_LINE_POINTS);
        assert!(breakdown.reasons.iter().any(|r| r.contains("Oncology")));
    }

    #[test]
    fn test_no_service_line_overlap() {
        let mut job = make_job();
        job.service_lines = vec!["orthopedics".to_string()];
        assert_eq!(
            HeuristicMatchScorer
                .score(&make_candidate(), &job)
                .service_line_points,
            0
        );
    }

    #[test]
    fn test_remote_requires_candidate_openness() {
        let mut job = make_job();
        job.remote = true;
        job.location = None;
        let mut candidate = make_candidate();
        assert_eq!(HeuristicMatchScorer.score(&candidate, &job).location_points, 0);

        candidate.open_to_remote = true;
        assert_eq!(
            HeuristicMatchScorer.score(&candidate, &job).location_points,
            LOCATION_POINTS
        );
    }

    #[test]
    fn test_relocation_partial_credit() {
        let mut job = make_job();
        job.location = Some("Nashville, TN".to_string());
        let mut candidate = make_candidate();
        assert_eq!(HeuristicMatchScorer.score(&candidate, &job).location_points, 0);

        candidate.willing_to_relocate = true;
        assert_eq!(
            HeuristicMatchScorer.score(&candidate, &job).location_points,
            RELOCATION_POINTS
        );
    }

    #[test]
    fn test_relocation_does_not_apply_to_remote_jobs() {
        let mut job = make_job();
        job.remote = true;
        let mut candidate = make_candidate();
        candidate.preferred_locations = vec!["Denver, CO".to_string()];
        candidate.willing_to_relocate = true;
        assert_eq!(HeuristicMatchScorer.score(&candidate, &job).location_points, 0);
    }

    #[test]
    fn test_compensation_below_expectation() {
        let mut candidate = make_candidate();
        candidate.desired_compensation = Some(500_000);
        let breakdown = HeuristicMatchScorer.score(&candidate, &make_job());
        assert_eq!(breakdown.compensation_points, 0);
    }

    #[test]
    fn test_compensation_unpublished_scores_zero() {
        let mut job = make_job();
        job.compensation_min = None;
        job.compensation_max = None;
        let mut candidate = make_candidate();
        candidate.desired_compensation = None;
        assert_eq!(
            HeuristicMatchScorer.score(&candidate, &job).compensation_points,
            0
        );
    }

    #[test]
    fn test_no_desired_compensation_scores_full() {
        let mut candidate = make_candidate();
        candidate.desired_compensation = None;
        assert_eq!(
            HeuristicMatchScorer
                .score(&candidate, &make_job())
                .compensation_points,
            COMPENSATION_POINTS
        );
    }

    fn awarded_components(breakdown: &MatchBreakdown) -> usize {
        [
            breakdown.level_points,
            breakdown.service_line_points,
            breakdown.location_points,
            breakdown.compensation_points,
        ]
        .iter()
        .filter(|p| **p > 0)
        .count()
    }

    #[test]
    fn test_every_awarded_component_has_a_reason() {
        let mut candidate = make_candidate();
        candidate.desired_compensation = None;
        let breakdown = HeuristicMatchScorer.score(&candidate, &make_job());
        assert_eq!(breakdown.compensation_points, COMPENSATION_POINTS);
        assert_eq!(breakdown.reasons.len(), awarded_components(&breakdown));
        assert!(breakdown
            .reasons
            .iter()
            .any(|r| r == "No compensation expectation set"));

        let mut job = make_job();
        job.level = "SENIOR_VICE_PRESIDENT".to_string();
        job.location = Some("Nashville, TN".to_string());
        candidate.willing_to_relocate = true;
        let breakdown = HeuristicMatchScorer.score(&candidate, &job);
        assert_eq!(breakdown.reasons.len(), awarded_components(&breakdown));
    }

    #[test]
    fn test_unknown_job_level_is_ignored() {
        let mut job = make_job();
        job.level = "INTERN".to_string();
        let breakdown = HeuristicMatchScorer.score(&make_candidate(), &job);
        assert_eq!(breakdown.level_points, 0);
        assert!(breakdown.total() <= 60);
    }
}
