use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub title: String,
    pub level: String,
    pub service_lines: Vec<String>,
    pub location: Option<String>,
    pub remote: bool,
    pub compensation_min: Option<i64>,
    pub compensation_max: Option<i64>,
    pub description: String,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
