// Candidate profiles and resumes.

pub mod handlers;
pub mod queries;
pub mod resume;

use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::auth::{upsert_user, AuthUser};
use crate::errors::AppError;
use crate::models::candidate::CandidateRow;
use crate::models::level::ExecLevel;
use crate::validation::{clean_optional, normalize_tags, require_text};
use queries::CandidateProfile;

const MAX_YEARS_EXPERIENCE: i32 = 60;

#[derive(Debug, Deserialize)]
pub struct CandidateInput {
    pub full_name: String,
    pub headline: Option<String>,
    pub current_title: Option<String>,
    #[serde(default)]
    pub years_experience: i32,
    #[serde(default)]
    pub target_levels: Vec<ExecLevel>,
    #[serde(default)]
    pub service_lines: Vec<String>,
    #[serde(default)]
    pub preferred_locations: Vec<String>,
    #[serde(default)]
    pub open_to_remote: bool,
    #[serde(default)]
    pub willing_to_relocate: bool,
    pub desired_compensation: Option<i64>,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl CandidateInput {
    pub fn validate(&self) -> Result<CandidateProfile, AppError> {
        if !(0..=MAX_YEARS_EXPERIENCE).contains(&self.years_experience) {
            return Err(AppError::Validation(format!(
                "years_experience must be between 0 and {MAX_YEARS_EXPERIENCE}"
            )));
        }
        if self.desired_compensation.is_some_and(|c| c < 0) {
            return Err(AppError::Validation(
                "desired_compensation cannot be negative".to_string(),
            ));
        }

        let mut levels = self.target_levels.clone();
        levels.sort();
        levels.dedup();

        let preferred_locations = self
            .preferred_locations
            .iter()
            .filter_map(|l| clean_optional(Some(l.as_str())))
            .fold(Vec::<String>::new(), |mut acc, l| {
                if !acc.iter().any(|a| a.eq_ignore_ascii_case(&l)) {
                    acc.push(l);
                }
                acc
            });

        Ok(CandidateProfile {
            full_name: require_text("full_name", &self.full_name, 200)?,
            headline: clean_optional(self.headline.as_deref()),
            current_title: clean_optional(self.current_title.as_deref()),
            years_experience: self.years_experience,
            target_levels: levels.iter().map(|l| l.as_str().to_string()).collect(),
            service_lines: normalize_tags(&self.service_lines),
            preferred_locations,
            open_to_remote: self.open_to_remote,
            willing_to_relocate: self.willing_to_relocate,
            desired_compensation: self.desired_compensation,
            visible: self.visible,
        })
    }
}

pub async fn upsert_profile(
    pool: &PgPool,
    user: &AuthUser,
    profile: &CandidateProfile,
) -> Result<CandidateRow, AppError> {
    let mut tx = pool.begin().await?;
    upsert_user(&mut *tx, user).await?;
    let row = queries::upsert(&mut *tx, user.id, profile).await?;
    tx.commit().await?;
    info!(candidate_id = %row.id, "Candidate profile saved");
    Ok(row)
}

/// Loads the caller's candidate profile or fails with 404.
pub async fn require_own(pool: &PgPool, user: &AuthUser) -> Result<CandidateRow, AppError> {
    queries::fetch_by_user(pool, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Candidate profile not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> CandidateInput {
        serde_json::from_value(serde_json::json!({
            "full_name": "  Priya Raman ",
            "years_experience": 22,
            "target_levels": ["C_SUITE", "SENIOR_VICE_PRESIDENT", "C_SUITE"],
            "service_lines": ["Oncology", "oncology ", "Population Health"],
            "preferred_locations": ["Chicago, IL", "chicago, il", " "],
            "desired_compensation": 450000
        }))
        .unwrap()
    }

    #[test]
    fn test_validate_normalizes_lists() {
        let profile = input().validate().unwrap();
        assert_eq!(profile.full_name, "Priya Raman");
        assert_eq!(
            profile.target_levels,
            vec!["SENIOR_VICE_PRESIDENT", "C_SUITE"]
        );
        assert_eq!(profile.service_lines, vec!["oncology", "population health"]);
        assert_eq!(profile.preferred_locations, vec!["Chicago, IL"]);
        assert!(profile.visible);
    }

    #[test]
    fn test_years_out_of_range() {
        let mut bad = input();
        bad.years_experience = 75;
        assert!(matches!(bad.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_negative_compensation() {
        let mut bad = input();
        bad.desired_compensation = Some(-5);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_unknown_level_fails_to_deserialize() {
        let parsed: Result<CandidateInput, _> = serde_json::from_value(serde_json::json!({
            "full_name": "A",
            "target_levels": ["INTERN"]
        }));
        assert!(parsed.is_err());
    }
}
