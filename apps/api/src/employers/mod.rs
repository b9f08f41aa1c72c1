// Employer accounts: profile upkeep and admin moderation.

pub mod handlers;
pub mod queries;
pub mod review;

use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::admin::audit::{self, AuditEntry, EntityType};
use crate::auth::{upsert_user, AuthUser};
use crate::errors::AppError;
use crate::jobs::workflow::JobEvent;
use crate::models::employer::EmployerRow;
use crate::validation::{clean_optional, require_reason, require_text};
use queries::EmployerProfile;
use review::{apply_review, status_after_edit, EmployerStatus, ReviewDecision};

#[derive(Debug, Deserialize)]
pub struct EmployerInput {
    pub organization_name: String,
    pub website: Option<String>,
    pub headquarters: Option<String>,
    pub description: Option<String>,
}

impl EmployerInput {
    pub fn validate(&self) -> Result<EmployerProfile, AppError> {
        let website = clean_optional(self.website.as_deref());
        if let Some(url) = &website {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(AppError::Validation(
                    "website must be an http(s) URL".to_string(),
                ));
            }
        }
        Ok(EmployerProfile {
            organization_name: require_text("organization_name", &self.organization_name, 200)?,
            website,
            headquarters: clean_optional(self.headquarters.as_deref()),
            description: clean_optional(self.description.as_deref()),
        })
    }
}

/// Creates the caller's employer profile, or updates it. A rejected profile
/// re-enters the review queue on edit.
pub async fn upsert_profile(
    pool: &PgPool,
    user: &AuthUser,
    profile: &EmployerProfile,
) -> Result<EmployerRow, AppError> {
    let mut tx = pool.begin().await?;
    upsert_user(&mut *tx, user).await?;

    // Existing profiles are edited under the row lock that admin reviews take.
    let row = match queries::insert_if_absent(&mut *tx, user.id, profile).await? {
        Some(row) => {
            info!(employer_id = %row.id, "Employer profile created, pending review");
            row
        }
        None => {
            let existing = queries::lock_by_user(&mut *tx, user.id)
                .await?
                .ok_or_else(|| AppError::NotFound("Employer profile not found".to_string()))?;
            let current: EmployerStatus = existing.status.parse()?;
            let next = status_after_edit(current);
            let row = queries::update_profile(&mut *tx, existing.id, profile, next).await?;
            if next != current {
                audit::record(
                    &mut *tx,
                    &AuditEntry::new(Some(user.id), EntityType::Employer, row.id, "employer.resubmit")
                        .transition(current.as_str(), next.as_str(), None),
                )
                .await?;
                info!(employer_id = %row.id, "Rejected employer profile resubmitted");
            }
            row
        }
    };

    tx.commit().await?;
    Ok(row)
}

/// Loads the caller's employer profile or fails with 404.
pub async fn require_own(pool: &PgPool, user: &AuthUser) -> Result<EmployerRow, AppError> {
    queries::fetch_by_user(pool, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employer profile not found".to_string()))
}

/// Applies an admin decision. Suspension also closes the employer's open jobs.
pub async fn review(
    pool: &PgPool,
    admin: &AuthUser,
    employer_id: Uuid,
    decision: ReviewDecision,
    reason: Option<&str>,
) -> Result<EmployerRow, AppError> {
    let reason = if decision.requires_reason() {
        Some(require_reason(reason)?)
    } else {
        clean_optional(reason)
    };

    let mut tx = pool.begin().await?;
    let employer = queries::lock(&mut *tx, employer_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employer {employer_id} not found")))?;

    let from: EmployerStatus = employer.status.parse()?;
    let to = apply_review(from, decision)?;
    let row = queries::set_status(&mut *tx, employer_id, to, reason.as_deref()).await?;

    audit::record(
        &mut *tx,
        &AuditEntry::new(Some(admin.id), EntityType::Employer, employer_id, decision.audit_action())
            .transition(from.as_str(), to.as_str(), reason.as_deref()),
    )
    .await?;

    if decision == ReviewDecision::Suspend {
        let closed = crate::jobs::queries::close_active_for_employer(&mut *tx, employer_id).await?;
        for (job_id, previous) in &closed {
            audit::record(
                &mut *tx,
                &AuditEntry::new(Some(admin.id), EntityType::Job, *job_id, JobEvent::Close.audit_action())
                    .transition(previous, "CLOSED", Some("employer suspended")),
            )
            .await?;
        }
        info!(%employer_id, closed = closed.len(), "Closed open jobs of suspended employer");
    }

    tx.commit().await?;
    info!(%employer_id, from = %from, to = %to, "Employer reviewed");
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> EmployerInput {
        EmployerInput {
            organization_name: " Mercy Regional Health ".to_string(),
            website: Some("https://mercyregional.org".to_string()),
            headquarters: Some(" ".to_string()),
            description: None,
        }
    }

    #[test]
    fn test_validate_trims_fields() {
        let profile = input().validate().unwrap();
        assert_eq!(profile.organization_name, "Mercy Regional Health");
        assert_eq!(profile.headquarters, None);
    }

    #[test]
    fn test_validate_rejects_bad_website() {
        let mut bad = input();
        bad.website = Some("mercyregional.org".to_string());
        assert!(matches!(bad.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_validate_requires_name() {
        let mut bad = input();
        bad.organization_name = "  ".to_string();
        assert!(bad.validate().is_err());
    }
}
