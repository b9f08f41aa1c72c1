//! Employer account moderation: the admin approval state machine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmployerStatus {
    Pending,
    Approved,
    Rejected,
    Suspended,
}

impl EmployerStatus {
    pub const ALL: [EmployerStatus; 4] = [
        EmployerStatus::Pending,
        EmployerStatus::Approved,
        EmployerStatus::Rejected,
        EmployerStatus::Suspended,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmployerStatus::Pending => "PENDING",
            EmployerStatus::Approved => "APPROVED",
            EmployerStatus::Rejected => "REJECTED",
            EmployerStatus::Suspended => "SUSPENDED",
        }
    }

    pub fn can_post_jobs(&self) -> bool {
        matches!(self, EmployerStatus::Approved)
    }
}

impl fmt::Display for EmployerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmployerStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(EmployerStatus::Pending),
            "APPROVED" => Ok(EmployerStatus::Approved),
            "REJECTED" => Ok(EmployerStatus::Rejected),
            "SUSPENDED" => Ok(EmployerStatus::Suspended),
            other => Err(AppError::Validation(format!(
                "unknown employer status '{other}'"
            ))),
        }
    }
}

/// Admin decision on an employer account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
    Suspend,
    Reinstate,
}

impl ReviewDecision {
    pub fn requires_reason(&self) -> bool {
        matches!(self, ReviewDecision::Reject | ReviewDecision::Suspend)
    }

    pub fn audit_action(&self) -> &'static str {
        match self {
            ReviewDecision::Approve => "employer.approve",
            ReviewDecision::Reject => "employer.reject",
            ReviewDecision::Suspend => "employer.suspend",
            ReviewDecision::Reinstate => "employer.reinstate",
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("cannot {decision:?} an employer in status {from}")]
pub struct InvalidReview {
    pub from: EmployerStatus,
    pub decision: ReviewDecision,
}

impl From<InvalidReview> for AppError {
    fn from(err: InvalidReview) -> Self {
        AppError::Conflict(err.to_string())
    }
}

/// Applies an admin decision, returning the resulting status.
pub fn apply_review(
    from: EmployerStatus,
    decision: ReviewDecision,
) -> Result<EmployerStatus, InvalidReview> {
    use EmployerStatus::*;
    use ReviewDecision::*;

    match (from, decision) {
        (Pending, Approve) => Ok(Approved),
        (Pending, Reject) => Ok(Rejected),
        (Approved, Suspend) => Ok(Suspended),
        (Suspended, Reinstate) => Ok(Approved),
        _ => Err(InvalidReview { from, decision }),
    }
}

/// Status after the employer edits their own profile. A rejected profile
/// goes back into the review queue; everything else is unchanged.
pub fn status_after_edit(current: EmployerStatus) -> EmployerStatus {
    match current {
        EmployerStatus::Rejected => EmployerStatus::Pending,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_can_be_approved_or_rejected() {
        assert_eq!(
            apply_review(EmployerStatus::Pending, ReviewDecision::Approve),
            Ok(EmployerStatus::Approved)
        );
        assert_eq!(
            apply_review(EmployerStatus::Pending, ReviewDecision::Reject),
            Ok(EmployerStatus::Rejected)
        );
    }

    #[test]
    fn test_suspend_and_reinstate() {
        let suspended = apply_review(EmployerStatus::Approved, ReviewDecision::Suspend).unwrap();
        assert_eq!(suspended, EmployerStatus::Suspended);
        assert_eq!(
            apply_review(suspended, ReviewDecision::Reinstate),
            Ok(EmployerStatus::Approved)
        );
    }

    #[test]
    fn test_invalid_decisions_rejected() {
        assert!(apply_review(EmployerStatus::Pending, ReviewDecision::Suspend).is_err());
        assert!(apply_review(EmployerStatus::Approved, ReviewDecision::Approve).is_err());
        assert!(apply_review(EmployerStatus::Rejected, ReviewDecision::Approve).is_err());
        assert!(apply_review(EmployerStatus::Suspended, ReviewDecision::Reject).is_err());
    }

    #[test]
    fn test_invalid_review_maps_to_conflict() {
        let err: AppError = apply_review(EmployerStatus::Approved, ReviewDecision::Reinstate)
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Conflict(msg) if msg.contains("APPROVED")));
    }

    #[test]
    fn test_edit_resubmits_rejected_profile() {
        assert_eq!(status_after_edit(EmployerStatus::Rejected), EmployerStatus::Pending);
        assert_eq!(status_after_edit(EmployerStatus::Approved), EmployerStatus::Approved);
        assert_eq!(status_after_edit(EmployerStatus::Suspended), EmployerStatus::Suspended);
    }

    #[test]
    fn test_only_approved_can_post() {
        assert!(EmployerStatus::Approved.can_post_jobs());
        assert!(!EmployerStatus::Pending.can_post_jobs());
        assert!(!EmployerStatus::Suspended.can_post_jobs());
    }

    #[test]
    fn test_reason_required_for_negative_decisions() {
        assert!(ReviewDecision::Reject.requires_reason());
        assert!(ReviewDecision::Suspend.requires_reason());
        assert!(!ReviewDecision::Approve.requires_reason());
    }
}
