use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub headline: Option<String>,
    pub current_title: Option<String>,
    pub years_experience: i32,
    pub target_levels: Vec<String>,
    pub service_lines: Vec<String>,
    pub preferred_locations: Vec<String>,
    pub open_to_remote: bool,
    pub willing_to_relocate: bool,
    pub desired_compensation: Option<i64>,
    pub resume_s3_key: Option<String>,
    /// Extracted text can be large; never sent back in profile payloads.
    #[serde(skip_serializing)]
    pub resume_text: Option<String>,
    pub visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
