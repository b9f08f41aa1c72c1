//! Axum route handlers for applications.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::applications::{self, pipeline::ApplicationStatus, ApplicationView};
use crate::auth::{AuthUser, Role};
use crate::candidates::handlers::ResumeLinkResponse;
use crate::candidates::resume;
use crate::errors::AppError;
use crate::models::application::ApplicationRow;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ApplyRequest {
    pub cover_letter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: ApplicationStatus,
}

/// POST /api/v1/jobs/:id/apply
pub async fn handle_apply(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<Uuid>,
    body: Option<Json<ApplyRequest>>,
) -> Result<Json<ApplicationRow>, AppError> {
    user.require(Role::Candidate)?;
    let Json(body) = body.unwrap_or_default();
    let candidate = crate::candidates::require_own(&state.db, &user).await?;
    let row = applications::apply(
        &state.db,
        state.match_scorer.as_ref(),
        state.config.match_cache_ttl(),
        &candidate,
        job_id,
        body.cover_letter.as_deref(),
    )
    .await?;
    Ok(Json(row))
}

/// GET /api/v1/jobs/:id/applications
///
/// Applicants for one of the caller's jobs, best match first.
pub async fn handle_list_for_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Vec<ApplicationView>>, AppError> {
    user.require(Role::Employer)?;
    let job = crate::jobs::get_managed(&state.db, &user, job_id).await?;
    let rows = applications::queries::list_for_job(&state.db, job.id).await?;
    Ok(Json(rows))
}

/// PATCH /api/v1/applications/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(application_id): Path<Uuid>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<ApplicationRow>, AppError> {
    user.require(Role::Employer)?;
    let row = applications::update_status(&state.db, &user, application_id, body.status).await?;
    Ok(Json(row))
}

/// POST /api/v1/applications/:id/withdraw
pub async fn handle_withdraw(
    State(state): State<AppState>,
    user: AuthUser,
    Path(application_id): Path<Uuid>,
) -> Result<Json<ApplicationRow>, AppError> {
    user.require(Role::Candidate)?;
    let candidate = crate::candidates::require_own(&state.db, &user).await?;
    let row = applications::withdraw(&state.db, &user, &candidate, application_id).await?;
    Ok(Json(row))
}

/// GET /api/v1/applications/:id/resume
///
/// Short-lived download link for the applicant's resume.
pub async fn handle_resume_link(
    State(state): State<AppState>,
    user: AuthUser,
    Path(application_id): Path<Uuid>,
) -> Result<Json<ResumeLinkResponse>, AppError> {
    user.require(Role::Employer)?;
    let application = applications::require_for_employer(&state.db, &user, application_id).await?;
    let candidate = crate::candidates::queries::fetch(&state.db, application.candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Candidate not found".to_string()))?;
    let key = candidate
        .resume_s3_key
        .ok_or_else(|| AppError::NotFound("Candidate has no resume".to_string()))?;
    let url = resume::presigned_link(&state.s3, &state.config.s3_bucket, &key).await?;
    Ok(Json(ResumeLinkResponse {
        url,
        expires_in_secs: resume::LINK_TTL.as_secs(),
    }))
}
