use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Executive seniority band, ordered from most junior to most senior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecLevel {
    Manager,
    Director,
    SeniorDirector,
    VicePresident,
    SeniorVicePresident,
    CSuite,
}

impl ExecLevel {
    pub const ALL: [ExecLevel; 6] = [
        ExecLevel::Manager,
        ExecLevel::Director,
        ExecLevel::SeniorDirector,
        ExecLevel::VicePresident,
        ExecLevel::SeniorVicePresident,
        ExecLevel::CSuite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecLevel::Manager => "MANAGER",
            ExecLevel::Director => "DIRECTOR",
            ExecLevel::SeniorDirector => "SENIOR_DIRECTOR",
            ExecLevel::VicePresident => "VICE_PRESIDENT",
            ExecLevel::SeniorVicePresident => "SENIOR_VICE_PRESIDENT",
            ExecLevel::CSuite => "C_SUITE",
        }
    }

    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Whether the two levels are exactly one seniority step apart.
    pub fn is_adjacent(&self, other: ExecLevel) -> bool {
        self.rank().abs_diff(other.rank()) == 1
    }
}

impl fmt::Display for ExecLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown executive level '{0}'")]
pub struct UnknownLevel(pub String);

impl FromStr for ExecLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        ExecLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == normalized)
            .ok_or_else(|| UnknownLevel(s.to_string()))
    }
}
