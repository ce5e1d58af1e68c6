use async_trait::async_trait;
use sqlx::PgPool;

use skyscraper_application::{
    AuditLogQuery, AuditLogRepository, AuditLogScope, MAX_AUDIT_LOG_LIMIT, MAX_AUDIT_LOG_OFFSET,
};
use skyscraper_core::{AppError, AppResult};
use skyscraper_domain::{AuditLogRecord, OrganizationalUnitId};
use uuid::Uuid;

use crate::postgres_rows::{AUDIT_LOG_COLUMNS, AuditLogRow};

/// PostgreSQL-backed repository for audit log reads.
#[derive(Clone)]
pub struct PostgresAuditLogRepository {
    pool: PgPool,
}

impl PostgresAuditLogRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogRepository for PostgresAuditLogRepository {
    async fn list_audit_log(
        &self,
        scope: &AuditLogScope,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogRecord>> {
        let capped_limit = query.limit.clamp(1, MAX_AUDIT_LOG_LIMIT) as i64;
        let capped_offset = query.offset.min(MAX_AUDIT_LOG_OFFSET) as i64;
        let unit_ids: Vec<Uuid> = scope
            .organizational_unit_ids
            .iter()
            .map(OrganizationalUnitId::as_uuid)
            .collect();

        let rows = sqlx::query_as::<_, AuditLogRow>(&format!(
            r#"
            SELECT {AUDIT_LOG_COLUMNS}
            FROM audit_logs
            WHERE (
                    (caller_type = $1 AND caller_id = $2)
                    OR (
                        resource_type = 'cloud_account'
                        AND resource_id IN (
                            SELECT id::TEXT
                            FROM cloud_accounts
                            WHERE organizational_unit_id = ANY($3)
                        )
                    )
                )
                AND ($4::TEXT IS NULL OR resource_type = $4)
                AND ($5::TEXT IS NULL OR resource_id = $5)
            ORDER BY id DESC
            LIMIT $6
            OFFSET $7
            "#
        ))
        .bind(scope.actor.kind().as_str())
        .bind(scope.actor.id())
        .bind(unit_ids)
        .bind(query.resource_type.map(|resource_type| resource_type.as_str()))
        .bind(query.resource_id)
        .bind(capped_limit)
        .bind(capped_offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list audit log: {error}")))?;

        rows.into_iter().map(AuditLogRow::into_record).collect()
    }
}
