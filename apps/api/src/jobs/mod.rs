// Job listings: employer authoring, review/payment workflow, public board.

pub mod expiry;
pub mod handlers;
pub mod listing;
pub mod queries;
pub mod validation;
pub mod workflow;

use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::admin::audit::{self, AuditEntry, EntityType};
use crate::auth::{AuthUser, Role};
use crate::config::Config;
use crate::employers::review::EmployerStatus;
use crate::errors::AppError;
use crate::models::employer::EmployerRow;
use crate::models::job::JobRow;
use crate::validation::require_reason;
use validation::ValidJob;
use workflow::{status_write, transition, Actor, JobEvent, JobStatus};

/// The caller's employer profile, required to be approved.
async fn approved_employer(pool: &PgPool, user: &AuthUser) -> Result<EmployerRow, AppError> {
    let employer = crate::employers::require_own(pool, user).await?;
    let status: EmployerStatus = employer.status.parse()?;
    if !status.can_post_jobs() {
        return Err(AppError::Forbidden);
    }
    Ok(employer)
}

fn not_found(job_id: Uuid) -> AppError {
    AppError::NotFound(format!("Job {job_id} not found"))
}

pub async fn create(pool: &PgPool, user: &AuthUser, job: &ValidJob) -> Result<JobRow, AppError> {
    let employer = approved_employer(pool, user).await?;
    let row = queries::insert(pool, employer.id, job).await?;
    info!(job_id = %row.id, employer_id = %employer.id, "Job drafted");
    Ok(row)
}

/// Replaces job content. Only DRAFT and REJECTED jobs are editable.
pub async fn update(
    pool: &PgPool,
    user: &AuthUser,
    job_id: Uuid,
    job: &ValidJob,
) -> Result<JobRow, AppError> {
    let employer = crate::employers::require_own(pool, user).await?;

    let mut tx = pool.begin().await?;
    let current = queries::lock(&mut *tx, job_id)
        .await?
        .filter(|j| j.employer_id == employer.id)
        .ok_or_else(|| not_found(job_id))?;

    let status: JobStatus = current.status.parse()?;
    if !status.is_editable() {
        return Err(AppError::Conflict(format!(
            "job in status {status} cannot be edited"
        )));
    }

    let row = queries::update_content(&mut *tx, job_id, job).await?;
    tx.commit().await?;
    Ok(row)
}

/// Visibility rule for a single job: LIVE jobs of approved employers are
/// public; anything else is visible only to its owner and admins.
pub async fn get_visible(
    pool: &PgPool,
    user: Option<&AuthUser>,
    job_id: Uuid,
) -> Result<JobRow, AppError> {
    let job = queries::fetch(pool, job_id).await?.ok_or_else(|| not_found(job_id))?;

    if queries::is_public(pool, job_id).await? {
        return Ok(job);
    }
    match user {
        Some(u) if u.is_admin() => Ok(job),
        Some(u) if u.role == Role::Employer => {
            let employer = crate::employers::queries::fetch_by_user(pool, u.id).await?;
            match employer {
                Some(e) if e.id == job.employer_id => Ok(job),
                _ => Err(not_found(job_id)),
            }
        }
        _ => Err(not_found(job_id)),
    }
}

/// Loads a job the caller may manage: admins manage any job, employers only their own.
pub async fn get_managed(pool: &PgPool, user: &AuthUser, job_id: Uuid) -> Result<JobRow, AppError> {
    let job = queries::fetch(pool, job_id).await?.ok_or_else(|| not_found(job_id))?;
    if user.is_admin() {
        return Ok(job);
    }
    user.require(Role::Employer)?;
    let employer = crate::employers::require_own(pool, user).await?;
    if job.employer_id != employer.id {
        return Err(not_found(job_id));
    }
    Ok(job)
}

/// Runs one workflow event against a job inside a transaction, writing the
/// audit entry alongside the status change.
pub async fn apply_event(
    pool: &PgPool,
    config: &Config,
    user: &AuthUser,
    job_id: Uuid,
    event: JobEvent,
    reason: Option<&str>,
) -> Result<JobRow, AppError> {
    let actor = if user.is_admin() {
        Actor::Admin
    } else {
        user.require(Role::Employer)?;
        Actor::Owner
    };

    let owner = match actor {
        Actor::Owner if matches!(event, JobEvent::Submit | JobEvent::Relist) => {
            Some(approved_employer(pool, user).await?)
        }
        Actor::Owner => Some(crate::employers::require_own(pool, user).await?),
        _ => None,
    };

    let reason = match event {
        JobEvent::Reject => Some(require_reason(reason)?),
        _ => None,
    };

    let mut tx = pool.begin().await?;
    let job = queries::lock(&mut *tx, job_id)
        .await?
        .filter(|j| owner.as_ref().map_or(true, |e| e.id == j.employer_id))
        .ok_or_else(|| not_found(job_id))?;

    let from: JobStatus = job.status.parse()?;
    let to = transition(from, event, actor, config.require_job_payment)?;

    let write = status_write(to, reason.clone(), Utc::now(), config.listing_duration());
    let row = queries::set_status(
        &mut *tx,
        job_id,
        write.status,
        write.rejection_reason.as_deref(),
        write.published,
    )
    .await?;

    audit::record(
        &mut *tx,
        &AuditEntry::new(Some(user.id), EntityType::Job, job_id, event.audit_action())
            .transition(from.as_str(), to.as_str(), reason.as_deref()),
    )
    .await?;
    tx.commit().await?;

    info!(%job_id, from = %from, to = %to, actor = ?actor, "Job transitioned");
    Ok(row)
}
