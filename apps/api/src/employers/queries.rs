use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::employers::review::EmployerStatus;
use crate::models::employer::EmployerRow;
use crate::pagination::Pagination;

/// Validated employer profile fields.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployerProfile {
    pub organization_name: String,
    pub website: Option<String>,
    pub headquarters: Option<String>,
    pub description: Option<String>,
}

pub async fn fetch_by_user<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
) -> Result<Option<EmployerRow>, sqlx::Error> {
    sqlx::query_as::<_, EmployerRow>("SELECT * FROM employers WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

pub async fn lock<'e, E: PgExecutor<'e>>(
    executor: E,
    employer_id: Uuid,
) -> Result<Option<EmployerRow>, sqlx::Error> {
    sqlx::query_as::<_, EmployerRow>("SELECT * FROM employers WHERE id = $1 FOR UPDATE")
        .bind(employer_id)
        .fetch_optional(executor)
        .await
}

const INSERT_IF_ABSENT_SQL: &str = r#"
    INSERT INTO employers (id, user_id, organization_name, website, headquarters, description, status)
    VALUES ($1, $2, $3, $4, $5, $6, 'PENDING')
    ON CONFLICT (user_id) DO NOTHING
    RETURNING *
"#;

const LOCK_BY_USER_SQL: &str = "SELECT * FROM employers WHERE user_id = $1 FOR UPDATE";

/// Creates the user's profile as PENDING. Returns `None` when a profile
/// already exists, including one inserted by a concurrent request.
pub async fn insert_if_absent<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    profile: &EmployerProfile,
) -> Result<Option<EmployerRow>, sqlx::Error> {
    sqlx::query_as::<_, EmployerRow>(INSERT_IF_ABSENT_SQL)
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&profile.organization_name)
        .bind(&profile.website)
        .bind(&profile.headquarters)
        .bind(&profile.description)
        .fetch_optional(executor)
        .await
}

pub async fn lock_by_user<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
) -> Result<Option<EmployerRow>, sqlx::Error> {
    sqlx::query_as::<_, EmployerRow>(LOCK_BY_USER_SQL)
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

pub async fn update_profile<'e, E: PgExecutor<'e>>(
    executor: E,
    employer_id: Uuid,
    profile: &EmployerProfile,
    status: EmployerStatus,
) -> Result<EmployerRow, sqlx::Error> {
    sqlx::query_as::<_, EmployerRow>(
        r#"
        UPDATE employers SET
            organization_name = $2, website = $3, headquarters = $4, description = $5,
            status = $6, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(employer_id)
    .bind(&profile.organization_name)
    .bind(&profile.website)
    .bind(&profile.headquarters)
    .bind(&profile.description)
    .bind(status.as_str())
    .fetch_one(executor)
    .await
}

pub async fn set_status<'e, E: PgExecutor<'e>>(
    executor: E,
    employer_id: Uuid,
    status: EmployerStatus,
    review_note: Option<&str>,
) -> Result<EmployerRow, sqlx::Error> {
    sqlx::query_as::<_, EmployerRow>(
        r#"
        UPDATE employers SET status = $2, review_note = $3, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(employer_id)
    .bind(status.as_str())
    .bind(review_note)
    .fetch_one(executor)
    .await
}

pub async fn list_by_status(
    pool: &PgPool,
    status: EmployerStatus,
    pagination: &Pagination,
) -> Result<(Vec<EmployerRow>, i64), sqlx::Error> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employers WHERE status = $1")
        .bind(status.as_str())
        .fetch_one(pool)
        .await?;
    let rows = sqlx::query_as::<_, EmployerRow>(
        "SELECT * FROM employers WHERE status = $1 ORDER BY updated_at ASC LIMIT $2 OFFSET $3",
    )
    .bind(status.as_str())
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;
    Ok((rows, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_write_tolerates_concurrent_insert() {
        assert!(INSERT_IF_ABSENT_SQL.contains("ON CONFLICT (user_id) DO NOTHING"));
        assert!(INSERT_IF_ABSENT_SQL.contains("RETURNING *"));
    }

    #[test]
    fn test_profile_edit_locks_the_row() {
        assert!(LOCK_BY_USER_SQL.ends_with("FOR UPDATE"));
        assert!(LOCK_BY_USER_SQL.contains("user_id = $1"));
    }
}
