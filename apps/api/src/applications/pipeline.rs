use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Hiring pipeline stage of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Submitted,
    Reviewing,
    Interviewing,
    Offered,
    Hired,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 7] = [
        ApplicationStatus::Submitted,
        ApplicationStatus::Reviewing,
        ApplicationStatus::Interviewing,
        ApplicationStatus::Offered,
        ApplicationStatus::Hired,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "SUBMITTED",
            ApplicationStatus::Reviewing => "REVIEWING",
            ApplicationStatus::Interviewing => "INTERVIEWING",
            ApplicationStatus::Offered => "OFFERED",
            ApplicationStatus::Hired => "HIRED",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::Withdrawn => "WITHDRAWN",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Hired | ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("unknown application status '{s}'")))
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("cannot move an application from {from} to {to}")]
pub struct InvalidStage {
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
}

impl From<InvalidStage> for AppError {
    fn from(err: InvalidStage) -> Self {
        AppError::Conflict(err.to_string())
    }
}

/// Employer-driven move. Forward only (skips allowed), or rejection from any
/// open stage. Withdrawal belongs to the candidate.
pub fn employer_advance(
    from: ApplicationStatus,
    to: ApplicationStatus,
) -> Result<ApplicationStatus, InvalidStage> {
    let allowed = !from.is_terminal()
        && match to {
            ApplicationStatus::Rejected => true,
            ApplicationStatus::Withdrawn | ApplicationStatus::Submitted => false,
            forward => forward > from,
        };
    if allowed {
        Ok(to)
    } else {
        Err(InvalidStage { from, to })
    }
}

/// Candidate-driven withdrawal from any open stage.
pub fn candidate_withdraw(from: ApplicationStatus) -> Result<ApplicationStatus, InvalidStage> {
    if from.is_terminal() {
        Err(InvalidStage {
            from,
            to: ApplicationStatus::Withdrawn,
        })
    } else {
        Ok(ApplicationStatus::Withdrawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ApplicationStatus::*;

    #[test]
    fn test_forward_moves_allowed() {
        assert_eq!(employer_advance(Submitted, Reviewing), Ok(Reviewing));
        assert_eq!(employer_advance(Submitted, Interviewing), Ok(Interviewing));
        assert_eq!(employer_advance(Offered, Hired), Ok(Hired));
    }

    #[test]
    fn test_backward_moves_rejected() {
        assert!(employer_advance(Interviewing, Reviewing).is_err());
        assert!(employer_advance(Reviewing, Reviewing).is_err());
        assert!(employer_advance(Reviewing, Submitted).is_err());
    }

    #[test]
    fn test_reject_from_any_open_stage() {
        for from in [Submitted, Reviewing, Interviewing, Offered] {
            assert_eq!(employer_advance(from, Rejected), Ok(Rejected));
        }
    }

    #[test]
    fn test_terminal_is_final() {
        assert!(employer_advance(Hired, Rejected).is_err());
        assert!(employer_advance(Withdrawn, Reviewing).is_err());
        assert!(candidate_withdraw(Rejected).is_err());
    }

    #[test]
    fn test_employer_cannot_withdraw() {
        assert!(employer_advance(Reviewing, Withdrawn).is_err());
    }

    #[test]
    fn test_candidate_withdraw() {
        assert_eq!(candidate_withdraw(Interviewing), Ok(Withdrawn));
    }
}
