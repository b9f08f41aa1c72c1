use serde::Deserialize;

use crate::errors::AppError;
use crate::models::level::ExecLevel;
use crate::validation::{clean_optional, normalize_tags, require_text};

const MAX_TITLE_CHARS: usize = 200;
const MAX_DESCRIPTION_CHARS: usize = 20_000;

/// Job payload as posted by an employer (create and edit).
#[derive(Debug, Clone, Deserialize)]
pub struct JobInput {
    pub title: String,
    pub level: ExecLevel,
    #[serde(default)]
    pub service_lines: Vec<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub remote: bool,
    pub compensation_min: Option<i64>,
    pub compensation_max: Option<i64>,
    pub description: String,
}

/// A `JobInput` that passed validation, with text trimmed and tags normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidJob {
    pub title: String,
    pub level: ExecLevel,
    pub service_lines: Vec<String>,
    pub location: Option<String>,
    pub remote: bool,
    pub compensation_min: Option<i64>,
    pub compensation_max: Option<i64>,
    pub description: String,
}

impl JobInput {
    pub fn validate(&self) -> Result<ValidJob, AppError> {
        let title = require_text("title", &self.title, MAX_TITLE_CHARS)?;
        let description = require_text("description", &self.description, MAX_DESCRIPTION_CHARS)?;

        let service_lines = normalize_tags(&self.service_lines);
        if service_lines.is_empty() {
            return Err(AppError::Validation(
                "at least one service line is required".to_string(),
            ));
        }

        let location = clean_optional(self.location.as_deref());
        if location.is_none() && !self.remote {
            return Err(AppError::Validation(
                "location is required for on-site roles".to_string(),
            ));
        }

        for (field, value) in [
            ("compensation_min", self.compensation_min),
            ("compensation_max", self.compensation_max),
        ] {
            if value.is_some_and(|v| v < 0) {
                return Err(AppError::Validation(format!("{field} cannot be negative")));
            }
        }
        if let (Some(min), Some(max)) = (self.compensation_min, self.compensation_max) {
            if min > max {
                return Err(AppError::Validation(
                    "compensation_min cannot exceed compensation_max".to_string(),
                ));
            }
        }

        Ok(ValidJob {
            title,
            level: self.level,
            service_lines,
            location,
            remote: self.remote,
            compensation_min: self.compensation_min,
            compensation_max: self.compensation_max,
            description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> JobInput {
        JobInput {
            title: " Chief Nursing Officer ".to_string(),
            level: ExecLevel::CSuite,
            service_lines: vec!["Nursing".to_string(), "nursing".to_string()],
            location: Some("Denver, CO".to_string()),
            remote: false,
            compensation_min: Some(350_000),
            compensation_max: Some(420_000),
            description: "Lead nursing across a 4-hospital system.".to_string(),
        }
    }

    #[test]
    fn test_valid_input_is_normalized() {
        let job = input().validate().unwrap();
        assert_eq!(job.title, "Chief Nursing Officer");
        assert_eq!(job.service_lines, vec!["nursing"]);
    }

    #[test]
    fn test_compensation_range_checked() {
        let mut bad = input();
        bad.compensation_min = Some(500_000);
        assert!(matches!(bad.validate(), Err(AppError::Validation(m)) if m.contains("exceed")));

        let mut negative = input();
        negative.compensation_max = Some(-1);
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_location_optional_only_when_remote() {
        let mut onsite = input();
        onsite.location = Some("  ".to_string());
        assert!(onsite.validate().is_err());

        let mut remote = onsite.clone();
        remote.remote = true;
        assert_eq!(remote.validate().unwrap().location, None);
    }

    #[test]
    fn test_service_line_required() {
        let mut bad = input();
        bad.service_lines = vec![" ".to_string()];
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_deserializes_level_name() {
        let parsed: JobInput = serde_json::from_value(serde_json::json!({
            "title": "VP Revenue Cycle",
            "level": "VICE_PRESIDENT",
            "service_lines": ["revenue cycle"],
            "remote": true,
            "description": "Own the revenue cycle."
        }))
        .unwrap();
        assert_eq!(parsed.level, ExecLevel::VicePresident);
        assert!(parsed.validate().is_ok());
    }
}
