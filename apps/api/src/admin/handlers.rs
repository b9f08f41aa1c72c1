//! Axum route handlers for platform administration. Every route is admin-only.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::admin::analytics::{self, PlatformSummary};
use crate::admin::audit::{self, AuditFilter};
use crate::auth::{AuthUser, Role};
use crate::employers::{self, review::EmployerStatus, review::ReviewDecision};
use crate::errors::AppError;
use crate::jobs::{self, workflow::JobEvent, workflow::JobStatus};
use crate::models::audit::AuditLogRow;
use crate::models::employer::EmployerRow;
use crate::models::job::JobRow;
use crate::pagination::{Page, Pagination};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub decision: ReviewDecision,
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReasonRequest {
    pub reason: Option<String>,
}

/// GET /api/v1/admin/employers?status=PENDING
pub async fn handle_list_employers(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<StatusQuery>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Page<EmployerRow>>, AppError> {
    user.require(Role::Admin)?;
    let status: EmployerStatus = match params.status.as_deref() {
        Some(s) => s.parse()?,
        None => EmployerStatus::Pending,
    };
    let (items, total) =
        employers::queries::list_by_status(&state.db, status, &pagination).await?;
    Ok(Json(Page::new(items, &pagination, total)))
}

/// POST /api/v1/admin/employers/:id/review
pub async fn handle_review_employer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(employer_id): Path<Uuid>,
    Json(body): Json<ReviewRequest>,
) -> Result<Json<EmployerRow>, AppError> {
    user.require(Role::Admin)?;
    let row = employers::review(
        &state.db,
        &user,
        employer_id,
        body.decision,
        body.reason.as_deref(),
    )
    .await?;
    Ok(Json(row))
}

/// GET /api/v1/admin/jobs?status=PENDING_REVIEW
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<StatusQuery>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Page<JobRow>>, AppError> {
    user.require(Role::Admin)?;
    let status: JobStatus = match params.status.as_deref() {
        Some(s) => s.parse()?,
        None => JobStatus::PendingReview,
    };
    let (items, total) = jobs::queries::list_by_status(&state.db, status, &pagination).await?;
    Ok(Json(Page::new(items, &pagination, total)))
}

async fn admin_job_event(
    state: &AppState,
    user: &AuthUser,
    job_id: Uuid,
    event: JobEvent,
    reason: Option<&str>,
) -> Result<Json<JobRow>, AppError> {
    user.require(Role::Admin)?;
    let row = jobs::apply_event(&state.db, &state.config, user, job_id, event, reason).await?;
    Ok(Json(row))
}

/// POST /api/v1/admin/jobs/:id/approve
pub async fn handle_approve_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    admin_job_event(&state, &user, job_id, JobEvent::Approve, None).await
}

/// POST /api/v1/admin/jobs/:id/reject
///
/// Body: `{ "reason": "..." }` (required).
pub async fn handle_reject_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<Uuid>,
    body: Option<Json<ReasonRequest>>,
) -> Result<Json<JobRow>, AppError> {
    let Json(body) = body.unwrap_or_default();
    admin_job_event(&state, &user, job_id, JobEvent::Reject, body.reason.as_deref()).await
}

/// POST /api/v1/admin/jobs/:id/confirm-payment
pub async fn handle_confirm_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    admin_job_event(&state, &user, job_id, JobEvent::ConfirmPayment, None).await
}

/// GET /api/v1/admin/audit-logs?entity_type=&entity_id=
pub async fn handle_audit_logs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(filter): Query<AuditFilter>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Page<AuditLogRow>>, AppError> {
    user.require(Role::Admin)?;
    let (items, total) = audit::list(&state.db, &filter, &pagination).await?;
    Ok(Json(Page::new(items, &pagination, total)))
}

/// GET /api/v1/admin/analytics
pub async fn handle_analytics(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<PlatformSummary>, AppError> {
    user.require(Role::Admin)?;
    Ok(Json(analytics::summary(&state.db).await?))
}
