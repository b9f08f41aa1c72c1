use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A cached candidate/job score. Primary key is (candidate_id, job_id).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatchRow {
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub score: i32,
    pub level_points: i32,
    pub service_line_points: i32,
    pub location_points: i32,
    pub compensation_points: i32,
    pub reasons: Vec<String>,
    pub computed_at: DateTime<Utc>,
}
