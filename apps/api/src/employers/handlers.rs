//! Axum route handlers for the employer's own account.

use axum::{extract::State, Json};

use crate::auth::{AuthUser, Role};
use crate::employers::{require_own, upsert_profile, EmployerInput};
use crate::errors::AppError;
use crate::models::employer::EmployerRow;
use crate::models::job::JobRow;
use crate::state::AppState;

/// GET /api/v1/employers/me
pub async fn handle_get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<EmployerRow>, AppError> {
    user.require(Role::Employer)?;
    Ok(Json(require_own(&state.db, &user).await?))
}

/// PUT /api/v1/employers/me
pub async fn handle_put_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<EmployerInput>,
) -> Result<Json<EmployerRow>, AppError> {
    user.require(Role::Employer)?;
    let profile = input.validate()?;
    Ok(Json(upsert_profile(&state.db, &user, &profile).await?))
}

/// GET /api/v1/employers/me/jobs
///
/// Every job the employer owns, in any status, newest first.
pub async fn handle_my_jobs(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<JobRow>>, AppError> {
    user.require(Role::Employer)?;
    let employer = require_own(&state.db, &user).await?;
    let jobs = crate::jobs::queries::list_by_employer(&state.db, employer.id).await?;
    Ok(Json(jobs))
}
