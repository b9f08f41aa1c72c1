// Candidate applications and the employer-side hiring pipeline.

pub mod handlers;
pub mod pipeline;
pub mod queries;

use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::admin::audit::{self, AuditEntry, EntityType};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::matching::{self, scoring::MatchScorer};
use crate::models::application::ApplicationRow;
use crate::models::candidate::CandidateRow;
use crate::validation::clean_optional;
use pipeline::{candidate_withdraw, employer_advance, ApplicationStatus};

pub use crate::models::application::ApplicationView;

const MAX_COVER_LETTER_CHARS: usize = 10_000;

fn not_found(application_id: Uuid) -> AppError {
    AppError::NotFound(format!("Application {application_id} not found"))
}

/// Submits an application to a public job. The current match score is
/// snapshotted onto the application; a scoring failure does not block it.
pub async fn apply(
    pool: &PgPool,
    scorer: &dyn MatchScorer,
    ttl: chrono::Duration,
    candidate: &CandidateRow,
    job_id: Uuid,
    cover_letter: Option<&str>,
) -> Result<ApplicationRow, AppError> {
    let cover_letter = clean_optional(cover_letter);
    if cover_letter
        .as_ref()
        .is_some_and(|c| c.chars().count() > MAX_COVER_LETTER_CHARS)
    {
        return Err(AppError::Validation(format!(
            "cover_letter must be at most {MAX_COVER_LETTER_CHARS} characters"
        )));
    }

    if !crate::jobs::queries::is_public(pool, job_id).await? {
        return Err(AppError::NotFound(format!("Job {job_id} not found")));
    }
    let job = crate::jobs::queries::fetch(pool, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let match_score = match matching::score_pair(pool, scorer, ttl, candidate, &job).await {
        Ok(row) => Some(row.score),
        Err(e) => {
            warn!(%job_id, candidate_id = %candidate.id, "Match snapshot failed: {e}");
            None
        }
    };

    let row = queries::insert(pool, job_id, candidate.id, cover_letter.as_deref(), match_score)
        .await?
        .ok_or_else(|| AppError::Conflict("You have already applied to this job".to_string()))?;

    info!(application_id = %row.id, %job_id, candidate_id = %candidate.id, "Application submitted");
    Ok(row)
}

/// Loads an application whose job belongs to the calling employer.
pub async fn require_for_employer(
    pool: &PgPool,
    user: &AuthUser,
    application_id: Uuid,
) -> Result<ApplicationRow, AppError> {
    let application = queries::fetch(pool, application_id)
        .await?
        .ok_or_else(|| not_found(application_id))?;
    // Ownership of the job is the ownership of its applications.
    crate::jobs::get_managed(pool, user, application.job_id)
        .await
        .map_err(|e| match e {
            AppError::NotFound(_) => not_found(application_id),
            other => other,
        })?;
    Ok(application)
}

pub async fn update_status(
    pool: &PgPool,
    user: &AuthUser,
    application_id: Uuid,
    to: ApplicationStatus,
) -> Result<ApplicationRow, AppError> {
    require_for_employer(pool, user, application_id).await?;

    let mut tx = pool.begin().await?;
    let current = queries::lock(&mut *tx, application_id)
        .await?
        .ok_or_else(|| not_found(application_id))?;
    let from: ApplicationStatus = current.status.parse()?;
    let to = employer_advance(from, to)?;
    let row = queries::set_status(&mut *tx, application_id, to).await?;
    audit::record(
        &mut *tx,
        &AuditEntry::new(Some(user.id), EntityType::Application, application_id, "application.status")
            .transition(from.as_str(), to.as_str(), None),
    )
    .await?;
    tx.commit().await?;

    info!(%application_id, from = %from, to = %to, "Application moved");
    Ok(row)
}

pub async fn withdraw(
    pool: &PgPool,
    user: &AuthUser,
    candidate: &CandidateRow,
    application_id: Uuid,
) -> Result<ApplicationRow, AppError> {
    let mut tx = pool.begin().await?;
    let current = queries::lock(&mut *tx, application_id)
        .await?
        .filter(|a| a.candidate_id == candidate.id)
        .ok_or_else(|| not_found(application_id))?;
    let from: ApplicationStatus = current.status.parse()?;
    let to = candidate_withdraw(from)?;
    let row = queries::set_status(&mut *tx, application_id, to).await?;
    audit::record(
        &mut *tx,
        &AuditEntry::new(Some(user.id), EntityType::Application, application_id, "application.withdraw")
            .transition(from.as_str(), to.as_str(), None),
    )
    .await?;
    tx.commit().await?;

    info!(%application_id, "Application withdrawn");
    Ok(row)
}
