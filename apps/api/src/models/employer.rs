use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmployerRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_name: String,
    pub website: Option<String>,
    pub headquarters: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub review_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
