//! Input normalization shared by the profile and job payloads.

use crate::errors::AppError;

/// Trims, lower-cases and de-duplicates a list of free-text tags,
/// dropping blanks. Order of first occurrence is kept.
pub fn normalize_tags(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let tag = value.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Trims an optional string, mapping blank input to `None`.
pub fn clean_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Requires a non-blank string of at most `max_chars` characters.
pub fn require_text(field: &str, value: &str, max_chars: usize) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    if trimmed.chars().count() > max_chars {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Requires a non-blank reason, used by reject/suspend decisions.
pub fn require_reason(reason: Option<&str>) -> Result<String, AppError> {
    clean_optional(reason)
        .ok_or_else(|| AppError::Validation("a reason is required for this decision".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tags_dedups_case_insensitively() {
        let input = vec![
            " Cardiology ".to_string(),
            "cardiology".to_string(),
            "Revenue   Cycle".to_string(),
            "   ".to_string(),
        ];
        assert_eq!(normalize_tags(&input), vec!["cardiology", "revenue cycle"]);
    }

    #[test]
    fn test_clean_optional() {
        assert_eq!(clean_optional(Some("  ")), None);
        assert_eq!(clean_optional(Some(" Boston ")), Some("Boston".to_string()));
        assert_eq!(clean_optional(None), None);
    }

    #[test]
    fn test_require_text_limits() {
        assert_eq!(require_text("title", "  CNO ", 10).unwrap(), "CNO");
        assert!(matches!(
            require_text("title", " ", 10),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            require_text("title", "Chief Nursing Officer", 10),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_require_reason() {
        assert!(require_reason(None).is_err());
        assert_eq!(require_reason(Some(" incomplete ")).unwrap(), "incomplete");
    }
}
