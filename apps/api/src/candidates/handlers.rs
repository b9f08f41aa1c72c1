//! Axum route handlers for the candidate's own account.

use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::applications::{self, ApplicationView};
use crate::auth::{AuthUser, Role};
use crate::candidates::{queries, require_own, resume, upsert_profile, CandidateInput};
use crate::errors::AppError;
use crate::matching::{clamp_limit, recommended_jobs, JobMatch};
use crate::models::candidate::CandidateRow;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ResumeLinkResponse {
    pub url: String,
    pub expires_in_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct ResumeUploadResponse {
    pub resume_s3_key: String,
    pub extracted_chars: usize,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// GET /api/v1/candidates/me
pub async fn handle_get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<CandidateRow>, AppError> {
    user.require(Role::Candidate)?;
    Ok(Json(require_own(&state.db, &user).await?))
}

/// PUT /api/v1/candidates/me
pub async fn handle_put_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CandidateInput>,
) -> Result<Json<CandidateRow>, AppError> {
    user.require(Role::Candidate)?;
    let profile = input.validate()?;
    Ok(Json(upsert_profile(&state.db, &user, &profile).await?))
}

/// POST /api/v1/candidates/me/resume
///
/// Multipart upload, field `resume`. Replaces any previous resume.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<ResumeUploadResponse>, AppError> {
    user.require(Role::Candidate)?;
    let candidate = require_own(&state.db, &user).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("resume") {
            continue;
        }
        let file_name = field.file_name().map(String::from);
        let content_type = field.content_type().map(String::from);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read resume: {e}")))?;

        resume::check_upload(
            file_name.as_deref(),
            content_type.as_deref(),
            &data,
            state.config.max_resume_bytes,
        )?;

        let text = resume::extract_text(data.clone()).await;
        let key = resume::object_key(candidate.id);
        resume::store(&state.s3, &state.config.s3_bucket, &key, data).await?;

        let previous = queries::set_resume(&state.db, candidate.id, &key, &text).await?;
        if let Some(old) = previous.filter(|old| old != &key) {
            resume::remove(&state.s3, &state.config.s3_bucket, &old).await;
        }

        return Ok(Json(ResumeUploadResponse {
            resume_s3_key: key,
            extracted_chars: text.chars().count(),
        }));
    }

    Err(AppError::Validation(
        "multipart field 'resume' is required".to_string(),
    ))
}

/// GET /api/v1/candidates/me/resume
pub async fn handle_resume_link(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ResumeLinkResponse>, AppError> {
    user.require(Role::Candidate)?;
    let candidate = require_own(&state.db, &user).await?;
    let key = candidate
        .resume_s3_key
        .ok_or_else(|| AppError::NotFound("No resume uploaded".to_string()))?;
    let url = resume::presigned_link(&state.s3, &state.config.s3_bucket, &key).await?;
    Ok(Json(ResumeLinkResponse {
        url,
        expires_in_secs: resume::LINK_TTL.as_secs(),
    }))
}

/// GET /api/v1/candidates/me/matches
///
/// Public jobs ranked by match score for the caller.
pub async fn handle_my_matches(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<JobMatch>>, AppError> {
    user.require(Role::Candidate)?;
    let candidate = require_own(&state.db, &user).await?;
    let matches = recommended_jobs(
        &state.db,
        state.match_scorer.as_ref(),
        state.config.match_cache_ttl(),
        &candidate,
        clamp_limit(params.limit),
    )
    .await?;
    Ok(Json(matches))
}

/// GET /api/v1/candidates/me/applications
pub async fn handle_my_applications(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ApplicationView>>, AppError> {
    user.require(Role::Candidate)?;
    let candidate = require_own(&state.db, &user).await?;
    let rows = applications::queries::list_for_candidate(&state.db, candidate.id).await?;
    Ok(Json(rows))
}
