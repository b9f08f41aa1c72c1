//! Axum route handlers for the job board and employer job management.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::{AuthUser, Role};
use crate::candidates::handlers::LimitQuery;
use crate::errors::AppError;
use crate::jobs::{self, listing::JobFilter, validation::JobInput, workflow::JobEvent};
use crate::matching::{clamp_limit, top_candidates, CandidateMatch};
use crate::models::job::JobRow;
use crate::pagination::{Page, Pagination};
use crate::state::AppState;

/// GET /api/v1/jobs
///
/// Public board: LIVE jobs of approved employers, filtered and paginated.
pub async fn handle_list_public(
    State(state): State<AppState>,
    Query(filter): Query<JobFilter>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Page<JobRow>>, AppError> {
    let (items, total) = jobs::listing::search(&state.db, &filter, &pagination).await?;
    Ok(Json(Page::new(items, &pagination, total)))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    Ok(Json(jobs::get_visible(&state.db, user.as_ref(), job_id).await?))
}

/// POST /api/v1/jobs
///
/// Creates a DRAFT job for the caller's approved employer account.
pub async fn handle_create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<JobInput>,
) -> Result<(StatusCode, Json<JobRow>), AppError> {
    user.require(Role::Employer)?;
    let job = input.validate()?;
    let row = jobs::create(&state.db, &user, &job).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/v1/jobs/:id
pub async fn handle_update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<Uuid>,
    Json(input): Json<JobInput>,
) -> Result<Json<JobRow>, AppError> {
    user.require(Role::Employer)?;
    let job = input.validate()?;
    Ok(Json(jobs::update(&state.db, &user, job_id, &job).await?))
}

async fn owner_event(
    state: &AppState,
    user: &AuthUser,
    job_id: Uuid,
    event: JobEvent,
) -> Result<Json<JobRow>, AppError> {
    let row = jobs::apply_event(&state.db, &state.config, user, job_id, event, None).await?;
    Ok(Json(row))
}

/// POST /api/v1/jobs/:id/submit
pub async fn handle_submit(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    user.require(Role::Employer)?;
    owner_event(&state, &user, job_id, JobEvent::Submit).await
}

/// POST /api/v1/jobs/:id/close
///
/// Owner or admin.
pub async fn handle_close(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    owner_event(&state, &user, job_id, JobEvent::Close).await
}

/// POST /api/v1/jobs/:id/relist
pub async fn handle_relist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    user.require(Role::Employer)?;
    owner_event(&state, &user, job_id, JobEvent::Relist).await
}

/// GET /api/v1/jobs/:id/matches
///
/// Visible candidates ranked for the job. Owner or admin.
pub async fn handle_job_matches(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<Uuid>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<CandidateMatch>>, AppError> {
    let job = jobs::get_managed(&state.db, &user, job_id).await?;
    let matches = top_candidates(
        &state.db,
        state.match_scorer.as_ref(),
        state.config.match_cache_ttl(),
        &job,
        clamp_limit(params.limit),
    )
    .await?;
    Ok(Json(matches))
}
