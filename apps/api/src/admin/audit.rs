//! Append-only audit trail for moderation and workflow transitions.

use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::audit::AuditLogRow;
use crate::pagination::Pagination;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Employer,
    Job,
    Application,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Employer => "employer",
            EntityType::Job => "job",
            EntityType::Application => "application",
        }
    }
}

/// One audit record waiting to be written.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub actor_id: Option<Uuid>,
    pub action: String,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub details: Value,
}

impl AuditEntry {
    pub fn new(
        actor_id: Option<Uuid>,
        entity_type: EntityType,
        entity_id: Uuid,
        action: impl Into<String>,
    ) -> Self {
        Self {
            actor_id,
            action: action.into(),
            entity_type,
            entity_id,
            details: json!({}),
        }
    }

    /// Records a status change as `{ "from": .., "to": .. }` plus optional reason.
    pub fn transition(mut self, from: &str, to: &str, reason: Option<&str>) -> Self {
        self.details = match reason {
            Some(reason) => json!({ "from": from, "to": to, "reason": reason }),
            None => json!({ "from": from, "to": to }),
        };
        self
    }
}

pub async fn record<'e, E: PgExecutor<'e>>(
    executor: E,
    entry: &AuditEntry,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, actor_id, action, entity_type, entity_id, details)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(entry.actor_id)
    .bind(&entry.action)
    .bind(entry.entity_type.as_str())
    .bind(entry.entity_id)
    .bind(&entry.details)
    .execute(executor)
    .await?;
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
pub struct AuditFilter {
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &AuditFilter) {
    qb.push(" WHERE TRUE");
    if let Some(entity_type) = &filter.entity_type {
        qb.push(" AND entity_type = ").push_bind(entity_type.clone());
    }
    if let Some(entity_id) = filter.entity_id {
        qb.push(" AND entity_id = ").push_bind(entity_id);
    }
}

/// Newest-first page of audit entries plus the total matching count.
pub async fn list(
    pool: &PgPool,
    filter: &AuditFilter,
    pagination: &Pagination,
) -> Result<(Vec<AuditLogRow>, i64), sqlx::Error> {
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM audit_logs");
    push_filter(&mut count, filter);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM audit_logs");
    push_filter(&mut qb, filter);
    qb.push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(pagination.limit())
        .push(" OFFSET ")
        .push_bind(pagination.offset());
    let rows = qb.build_query_as::<AuditLogRow>().fetch_all(pool).await?;

    Ok((rows, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_details_with_reason() {
        let entry = AuditEntry::new(Some(Uuid::new_v4()), EntityType::Job, Uuid::new_v4(), "job.reject")
            .transition("PENDING_REVIEW", "REJECTED", Some("missing compensation"));
        assert_eq!(entry.details["from"], "PENDING_REVIEW");
        assert_eq!(entry.details["to"], "REJECTED");
        assert_eq!(entry.details["reason"], "missing compensation");
    }

    #[test]
    fn test_transition_details_without_reason() {
        let entry = AuditEntry::new(None, EntityType::Employer, Uuid::new_v4(), "employer.approve")
            .transition("PENDING", "APPROVED", None);
        assert!(entry.details.get("reason").is_none());
        assert!(entry.actor_id.is_none());
    }

    #[test]
    fn test_filter_sql() {
        let filter = AuditFilter {
            entity_type: Some("job".to_string()),
            entity_id: Some(Uuid::new_v4()),
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM audit_logs");
        push_filter(&mut qb, &filter);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM audit_logs WHERE TRUE AND entity_type = $1 AND entity_id = $2"
        );
    }
}
