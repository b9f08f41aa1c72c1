//! Public job board query: LIVE jobs from approved employers, filtered.

use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::errors::AppError;
use crate::models::job::JobRow;
use crate::models::level::ExecLevel;
use crate::pagination::Pagination;
use crate::validation::normalize_tags;

#[derive(Debug, Default, Deserialize)]
pub struct JobFilter {
    /// Comma-separated levels, e.g. `DIRECTOR,VICE_PRESIDENT`.
    pub levels: Option<String>,
    pub service_line: Option<String>,
    pub location: Option<String>,
    pub remote: Option<bool>,
    pub min_compensation: Option<i64>,
    pub q: Option<String>,
}

impl JobFilter {
    /// The service line normalized the same way stored tags are.
    pub fn service_line_tag(&self) -> Option<String> {
        let raw = self.service_line.clone()?;
        normalize_tags(&[raw]).pop()
    }

    pub fn parsed_levels(&self) -> Result<Vec<&'static str>, AppError> {
        let Some(raw) = self.levels.as_deref() else {
            return Ok(vec![]);
        };
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<ExecLevel>()
                    .map(|l| l.as_str())
                    .map_err(|e| AppError::Validation(e.to_string()))
            })
            .collect()
    }
}

fn like_pattern(value: &str) -> String {
    let escaped = value
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn push_filter(
    qb: &mut QueryBuilder<'_, Postgres>,
    filter: &JobFilter,
    levels: Vec<&'static str>,
) {
    qb.push(
        " FROM jobs j JOIN employers e ON e.id = j.employer_id \
          WHERE j.status = 'LIVE' AND e.status = 'APPROVED'",
    );
    if !levels.is_empty() {
        let levels: Vec<String> = levels.into_iter().map(String::from).collect();
        qb.push(" AND j.level = ANY(").push_bind(levels).push(")");
    }
    if let Some(line) = filter.service_line_tag() {
        qb.push(" AND ")
            .push_bind(line)
            .push(" = ANY(j.service_lines)");
    }
    if let Some(location) = filter.location.as_deref().filter(|s| !s.trim().is_empty()) {
        qb.push(" AND j.location ILIKE ").push_bind(like_pattern(location));
    }
    if let Some(remote) = filter.remote {
        qb.push(" AND j.remote = ").push_bind(remote);
    }
    if let Some(min) = filter.min_compensation {
        qb.push(" AND COALESCE(j.compensation_max, j.compensation_min) >= ")
            .push_bind(min);
    }
    if let Some(q) = filter.q.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(q);
        qb.push(" AND (j.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR j.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

pub async fn search(
    pool: &PgPool,
    filter: &JobFilter,
    pagination: &Pagination,
) -> Result<(Vec<JobRow>, i64), AppError> {
    let levels = filter.parsed_levels()?;

    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
    push_filter(&mut count, filter, levels.clone());
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::<Postgres>::new("SELECT j.*");
    push_filter(&mut qb, filter, levels);
    qb.push(" ORDER BY j.published_at DESC NULLS LAST, j.id LIMIT ")
        .push_bind(pagination.limit())
        .push(" OFFSET ")
        .push_bind(pagination.offset());
    let rows = qb.build_query_as::<JobRow>().fetch_all(pool).await?;

    Ok((rows, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_levels() {
        let filter = JobFilter {
            levels: Some("director, vice president,".to_string()),
            ..Default::default()
        };
        assert_eq!(
            filter.parsed_levels().unwrap(),
            vec!["DIRECTOR", "VICE_PRESIDENT"]
        );
    }

    #[test]
    fn test_unknown_level_is_validation_error() {
        let filter = JobFilter {
            levels: Some("INTERN".to_string()),
            ..Default::default()
        };
        assert!(matches!(filter.parsed_levels(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" 100%_ "), "%100\\%\\_%");
    }

    #[test]
    fn test_filter_sql_includes_all_clauses() {
        let filter = JobFilter {
            levels: Some("DIRECTOR".to_string()),
            service_line: Some("Oncology".to_string()),
            location: Some("Boston".to_string()),
            remote: Some(false),
            min_compensation: Some(200_000),
            q: Some("oncology".to_string()),
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        push_filter(&mut qb, &filter, filter.parsed_levels().unwrap());
        let sql = qb.sql();
        assert!(sql.contains("j.status = 'LIVE'"));
        assert!(sql.contains("e.status = 'APPROVED'"));
        assert!(sql.contains("j.level = ANY($1)"));
        assert!(sql.contains("$2 = ANY(j.service_lines)"));
        assert!(sql.contains("j.location ILIKE $3"));
        assert!(sql.contains("j.remote = $4"));
        assert!(sql.contains(">= $5"));
        assert!(sql.contains("j.title ILIKE $6 OR j.description ILIKE $7"));
    }

    #[test]
    fn test_empty_filter_only_restricts_visibility() {
        let filter = JobFilter::default();
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        push_filter(&mut qb, &filter, vec![]);
        assert!(!qb.sql().contains('$'));
    }

    #[test]
    fn test_service_line_matches_stored_tag_form() {
        let filter = JobFilter {
            service_line: Some("  Revenue   Cycle ".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.service_line_tag().as_deref(), Some("revenue cycle"));
        assert_eq!(
            filter.service_line_tag(),
            normalize_tags(&["revenue cycle".to_string()]).pop()
        );

        let blank = JobFilter {
            service_line: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.service_line_tag(), None);
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        push_filter(&mut qb, &blank, vec![]);
        assert!(!qb.sql().contains("service_lines"));
    }
}
