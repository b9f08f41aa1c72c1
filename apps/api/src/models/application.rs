use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub cover_letter: Option<String>,
    pub status: String,
    pub match_score: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Application joined with the job title and applicant summary, for list views.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApplicationView {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub application: ApplicationRow,
    pub job_title: String,
    pub candidate_name: String,
    pub candidate_headline: Option<String>,
}
