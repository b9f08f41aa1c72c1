use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::jobs::validation::ValidJob;
use crate::jobs::workflow::JobStatus;
use crate::models::job::JobRow;
use crate::pagination::Pagination;

pub async fn fetch(pool: &PgPool, job_id: Uuid) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await
}

/// Every LIVE job whose employer is in good standing.
pub async fn all_public(pool: &PgPool) -> Result<Vec<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>(
        r#"
        SELECT j.* FROM jobs j
        JOIN employers e ON e.id = j.employer_id
        WHERE j.status = 'LIVE' AND e.status = 'APPROVED'
        ORDER BY j.published_at DESC NULLS LAST
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn is_public(pool: &PgPool, job_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM jobs j
            JOIN employers e ON e.id = j.employer_id
            WHERE j.id = $1 AND j.status = 'LIVE' AND e.status = 'APPROVED'
        )
        "#,
    )
    .bind(job_id)
    .fetch_one(pool)
    .await
}

pub async fn list_by_employer(pool: &PgPool, employer_id: Uuid) -> Result<Vec<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>(
        "SELECT * FROM jobs WHERE employer_id = $1 ORDER BY created_at DESC",
    )
    .bind(employer_id)
    .fetch_all(pool)
    .await
}

pub async fn list_by_status(
    pool: &PgPool,
    status: JobStatus,
    pagination: &Pagination,
) -> Result<(Vec<JobRow>, i64), sqlx::Error> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE status = $1")
        .bind(status.as_str())
        .fetch_one(pool)
        .await?;
    // Review queues are worked oldest-first.
    let rows = sqlx::query_as::<_, JobRow>(
        "SELECT * FROM jobs WHERE status = $1 ORDER BY updated_at ASC LIMIT $2 OFFSET $3",
    )
    .bind(status.as_str())
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;
    Ok((rows, total))
}

pub async fn insert(pool: &PgPool, employer_id: Uuid, job: &ValidJob) -> Result<JobRow, sqlx::Error> {
    sqlx::query_as::<_, JobRow>(
        r#"
        INSERT INTO jobs
            (id, employer_id, title, level, service_lines, location, remote,
             compensation_min, compensation_max, description, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'DRAFT')
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(employer_id)
    .bind(&job.title)
    .bind(job.level.as_str())
    .bind(&job.service_lines)
    .bind(&job.location)
    .bind(job.remote)
    .bind(job.compensation_min)
    .bind(job.compensation_max)
    .bind(&job.description)
    .fetch_one(pool)
    .await
}

pub async fn update_content<'e, E: PgExecutor<'e>>(
    executor: E,
    job_id: Uuid,
    job: &ValidJob,
) -> Result<JobRow, sqlx::Error> {
    sqlx::query_as::<_, JobRow>(
        r#"
        UPDATE jobs SET
            title = $2, level = $3, service_lines = $4, location = $5, remote = $6,
            compensation_min = $7, compensation_max = $8, description = $9,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(job_id)
    .bind(&job.title)
    .bind(job.level.as_str())
    .bind(&job.service_lines)
    .bind(&job.location)
    .bind(job.remote)
    .bind(job.compensation_min)
    .bind(job.compensation_max)
    .bind(&job.description)
    .fetch_one(executor)
    .await
}

pub async fn lock<'e, E: PgExecutor<'e>>(
    executor: E,
    job_id: Uuid,
) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1 FOR UPDATE")
        .bind(job_id)
        .fetch_optional(executor)
        .await
}

/// Status write used by every workflow transition. `published_at` and
/// `expires_at` are only overwritten when a value is given.
pub async fn set_status<'e, E: PgExecutor<'e>>(
    executor: E,
    job_id: Uuid,
    status: JobStatus,
    rejection_reason: Option<&str>,
    published: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> Result<JobRow, sqlx::Error> {
    let (published_at, expires_at) = published.unzip();
    sqlx::query_as::<_, JobRow>(
        r#"
        UPDATE jobs SET
            status = $2,
            rejection_reason = $3,
            published_at = COALESCE($4, published_at),
            expires_at = COALESCE($5, expires_at),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(job_id)
    .bind(status.as_str())
    .bind(rejection_reason)
    .bind(published_at)
    .bind(expires_at)
    .fetch_one(executor)
    .await
}

/// Closes every open job of an employer; returns `(id, previous status)`.
pub async fn close_active_for_employer<'e, E: PgExecutor<'e>>(
    executor: E,
    employer_id: Uuid,
) -> Result<Vec<(Uuid, String)>, sqlx::Error> {
    let active: Vec<&'static str> = JobStatus::ALL
        .iter()
        .filter(|s| s.is_active())
        .map(|s| s.as_str())
        .collect();
    sqlx::query_as::<_, (Uuid, String)>(
        r#"
        UPDATE jobs j SET status = 'CLOSED', updated_at = now()
        FROM (
            SELECT id, status FROM jobs
            WHERE employer_id = $1
              AND status = ANY($2)
            FOR UPDATE
        ) prev
        WHERE j.id = prev.id
        RETURNING j.id, prev.status
        "#,
    )
    .bind(employer_id)
    .bind(active)
    .fetch_all(executor)
    .await
}

/// Moves every LIVE job past its expiry to EXPIRED; returns the affected ids.
pub async fn expire_due<'e, E: PgExecutor<'e>>(
    executor: E,
    now: DateTime<Utc>,
) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        UPDATE jobs SET status = 'EXPIRED', updated_at = now()
        WHERE status = 'LIVE' AND expires_at IS NOT NULL AND expires_at <= $1
        RETURNING id
        "#,
    )
    .bind(now)
    .fetch_all(executor)
    .await
}
