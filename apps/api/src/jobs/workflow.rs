//! Job listing lifecycle.
//!
//! A job is created as `DRAFT`, goes through admin review and (optionally)
//! payment before it becomes `LIVE`, and leaves `LIVE` by being closed or by
//! expiring. Only `LIVE` jobs are publicly visible.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Draft,
    PendingReview,
    PendingPayment,
    Live,
    Rejected,
    Closed,
    Expired,
}

impl JobStatus {
    pub const ALL: [JobStatus; 7] = [
        JobStatus::Draft,
        JobStatus::PendingReview,
        JobStatus::PendingPayment,
        JobStatus::Live,
        JobStatus::Rejected,
        JobStatus::Closed,
        JobStatus::Expired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Draft => "DRAFT",
            JobStatus::PendingReview => "PENDING_REVIEW",
            JobStatus::PendingPayment => "PENDING_PAYMENT",
            JobStatus::Live => "LIVE",
            JobStatus::Rejected => "REJECTED",
            JobStatus::Closed => "CLOSED",
            JobStatus::Expired => "EXPIRED",
        }
    }

    /// Content edits are only accepted before review or after a rejection.
    pub fn is_editable(&self) -> bool {
        matches!(self, JobStatus::Draft | JobStatus::Rejected)
    }

    /// Statuses that are closed when the owning employer is suspended.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            JobStatus::PendingReview | JobStatus::PendingPayment | JobStatus::Live
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("unknown job status '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobEvent {
    Submit,
    Approve,
    Reject,
    ConfirmPayment,
    Close,
    Expire,
    Relist,
}

impl JobEvent {
    pub fn audit_action(&self) -> &'static str {
        match self {
            JobEvent::Submit => "job.submit",
            JobEvent::Approve => "job.approve",
            JobEvent::Reject => "job.reject",
            JobEvent::ConfirmPayment => "job.confirm_payment",
            JobEvent::Close => "job.close",
            JobEvent::Expire => "job.expire",
            JobEvent::Relist => "job.relist",
        }
    }
}

/// Who is driving a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Owner,
    Admin,
    System,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot {event:?} a job in status {from}")]
    InvalidState { from: JobStatus, event: JobEvent },
    #[error("{actor:?} may not {event:?} a job")]
    NotPermitted { actor: Actor, event: JobEvent },
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::InvalidState { .. } => AppError::Conflict(err.to_string()),
            TransitionError::NotPermitted { .. } => AppError::Forbidden,
        }
    }
}

fn permitted(actor: Actor, event: JobEvent) -> bool {
    match event {
        JobEvent::Submit | JobEvent::Relist => actor == Actor::Owner,
        JobEvent::Approve | JobEvent::Reject | JobEvent::ConfirmPayment => actor == Actor::Admin,
        JobEvent::Close => matches!(actor, Actor::Owner | Actor::Admin),
        JobEvent::Expire => actor == Actor::System,
    }
}

/// Computes the status a job moves to. `require_payment` decides whether an
/// approved job waits in `PENDING_PAYMENT` or goes straight to `LIVE`.
pub fn transition(
    from: JobStatus,
    event: JobEvent,
    actor: Actor,
    require_payment: bool,
) -> Result<JobStatus, TransitionError> {
    use JobStatus::*;

    if !permitted(actor, event) {
        return Err(TransitionError::NotPermitted { actor, event });
    }

    let to = match (from, event) {
        (Draft | Rejected, JobEvent::Submit) => PendingReview,
        (PendingReview, JobEvent::Approve) if require_payment => PendingPayment,
        (PendingReview, JobEvent::Approve) => Live,
        (PendingReview, JobEvent::Reject) => Rejected,
        (PendingPayment, JobEvent::ConfirmPayment) => Live,
        (Draft | PendingReview | PendingPayment | Live, JobEvent::Close) => Closed,
        (Live, JobEvent::Expire) => Expired,
        (Closed | Expired, JobEvent::Relist) => PendingReview,
        _ => return Err(TransitionError::InvalidState { from, event }),
    };
    Ok(to)
}

/// Columns written alongside a new status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusWrite {
    pub status: JobStatus,
    /// Kept only on entering `REJECTED`; any other status clears it.
    pub rejection_reason: Option<String>,
    /// `(published_at, expires_at)`, set on entering `LIVE`.
    pub published: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

pub fn status_write(
    to: JobStatus,
    reason: Option<String>,
    now: DateTime<Utc>,
    listing_duration: Duration,
) -> StatusWrite {
    StatusWrite {
        status: to,
        rejection_reason: reason.filter(|_| to == JobStatus::Rejected),
        published: (to == JobStatus::Live).then(|| (now, now + listing_duration)),
    }
}
