use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::applications::pipeline::ApplicationStatus;
use crate::models::application::{ApplicationRow, ApplicationView};

const VIEW_SELECT: &str = r#"
    SELECT a.*, j.title AS job_title, c.full_name AS candidate_name,
           c.headline AS candidate_headline
    FROM applications a
    JOIN jobs j ON j.id = a.job_id
    JOIN candidates c ON c.id = a.candidate_id
"#;

pub async fn fetch(pool: &PgPool, application_id: Uuid) -> Result<Option<ApplicationRow>, sqlx::Error> {
    sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
        .bind(application_id)
        .fetch_optional(pool)
        .await
}

pub async fn lock<'e, E: PgExecutor<'e>>(
    executor: E,
    application_id: Uuid,
) -> Result<Option<ApplicationRow>, sqlx::Error> {
    sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1 FOR UPDATE")
        .bind(application_id)
        .fetch_optional(executor)
        .await
}

/// Inserts a new application; returns `None` when the candidate already applied.
pub async fn insert(
    pool: &PgPool,
    job_id: Uuid,
    candidate_id: Uuid,
    cover_letter: Option<&str>,
    match_score: Option<i32>,
) -> Result<Option<ApplicationRow>, sqlx::Error> {
    sqlx::query_as::<_, ApplicationRow>(
        r#"
        INSERT INTO applications (id, job_id, candidate_id, cover_letter, status, match_score)
        VALUES ($1, $2, $3, $4, 'SUBMITTED', $5)
        ON CONFLICT (job_id, candidate_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(job_id)
    .bind(candidate_id)
    .bind(cover_letter)
    .bind(match_score)
    .fetch_optional(pool)
    .await
}

pub async fn set_status<'e, E: PgExecutor<'e>>(
    executor: E,
    application_id: Uuid,
    status: ApplicationStatus,
) -> Result<ApplicationRow, sqlx::Error> {
    sqlx::query_as::<_, ApplicationRow>(
        "UPDATE applications SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(application_id)
    .bind(status.as_str())
    .fetch_one(executor)
    .await
}

pub async fn list_for_candidate(
    pool: &PgPool,
    candidate_id: Uuid,
) -> Result<Vec<ApplicationView>, sqlx::Error> {
    sqlx::query_as::<_, ApplicationView>(&format!(
        "{VIEW_SELECT} WHERE a.candidate_id = $1 ORDER BY a.created_at DESC"
    ))
    .bind(candidate_id)
    .fetch_all(pool)
    .await
}

pub async fn list_for_job(pool: &PgPool, job_id: Uuid) -> Result<Vec<ApplicationView>, sqlx::Error> {
    sqlx::query_as::<_, ApplicationView>(&format!(
        "{VIEW_SELECT} WHERE a.job_id = $1 ORDER BY a.match_score DESC NULLS LAST, a.created_at ASC"
    ))
    .bind(job_id)
    .fetch_all(pool)
    .await
}
