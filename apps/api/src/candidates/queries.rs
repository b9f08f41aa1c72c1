use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::candidate::CandidateRow;

/// Validated candidate profile fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateProfile {
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
    pub visible: bool,
}

pub async fn fetch(pool: &PgPool, candidate_id: Uuid) -> Result<Option<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE id = $1")
        .bind(candidate_id)
        .fetch_optional(pool)
        .await
}

pub async fn fetch_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn all_visible(pool: &PgPool) -> Result<Vec<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE visible = TRUE ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn upsert<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    profile: &CandidateProfile,
) -> Result<CandidateRow, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>(
        r#"
        INSERT INTO candidates
            (id, user_id, full_name, headline, current_title, years_experience,
             target_levels, service_lines, preferred_locations, open_to_remote,
             willing_to_relocate, desired_compensation, visible)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        ON CONFLICT (user_id) DO UPDATE SET
            full_name = EXCLUDED.full_name,
            headline = EXCLUDED.headline,
            current_title = EXCLUDED.current_title,
            years_experience = EXCLUDED.years_experience,
            target_levels = EXCLUDED.target_levels,
            service_lines = EXCLUDED.service_lines,
            preferred_locations = EXCLUDED.preferred_locations,
            open_to_remote = EXCLUDED.open_to_remote,
            willing_to_relocate = EXCLUDED.willing_to_relocate,
            desired_compensation = EXCLUDED.desired_compensation,
            visible = EXCLUDED.visible,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&profile.full_name)
    .bind(&profile.headline)
    .bind(&profile.current_title)
    .bind(profile.years_experience)
    .bind(&profile.target_levels)
    .bind(&profile.service_lines)
    .bind(&profile.preferred_locations)
    .bind(profile.open_to_remote)
    .bind(profile.willing_to_relocate)
    .bind(profile.desired_compensation)
    .bind(profile.visible)
    .fetch_one(executor)
    .await
}

/// Stores the resume location and extracted text; returns the previous key.
pub async fn set_resume(
    pool: &PgPool,
    candidate_id: Uuid,
    s3_key: &str,
    text: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, Option<String>>(
        r#"
        UPDATE candidates c SET resume_s3_key = $2, resume_text = $3, updated_at = now()
        FROM (SELECT resume_s3_key FROM candidates WHERE id = $1 FOR UPDATE) prev
        WHERE c.id = $1
        RETURNING prev.resume_s3_key
        "#,
    )
    .bind(candidate_id)
    .bind(s3_key)
    .bind(text)
    .fetch_one(pool)
    .await
}
