//! Audit log read access.

use std::sync::Arc;

use async_trait::async_trait;
use skyscraper_core::AppResult;
use skyscraper_domain::{AuditLogRecord, AuditResourceType, Caller, OrganizationalUnitId};

use crate::CallerResolver;

/// Upper bound for one audit log page.
pub const MAX_AUDIT_LOG_LIMIT: usize = 200;
/// Upper bound for the audit log page offset.
pub const MAX_AUDIT_LOG_OFFSET: usize = 5_000;

/// Query parameters for audit log listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogQuery {
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
    /// Optional resource type filter.
    pub resource_type: Option<AuditResourceType>,
    /// Optional resource identifier filter.
    pub resource_id: Option<String>,
}

impl Default for AuditLogQuery {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
            resource_type: None,
            resource_id: None,
        }
    }
}

/// Audit records one caller may read.
///
/// A record is in scope when `actor` wrote it, or when it is a
/// `cloud_account` record for an account owned by one of
/// `organizational_unit_ids`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogScope {
    /// The reading caller.
    pub actor: Caller,
    /// Units reachable by the reading caller.
    pub organizational_unit_ids: Vec<OrganizationalUnitId>,
}

impl AuditLogScope {
    /// Returns whether `record` is in scope. `cloud_account_unit` is the unit
    /// owning the record's resource, when that resource is a known cloud account.
    #[must_use]
    pub fn includes(
        &self,
        record: &AuditLogRecord,
        cloud_account_unit: Option<OrganizationalUnitId>,
    ) -> bool {
        record.actor == self.actor
            || (record.resource_type == AuditResourceType::CloudAccount
                && cloud_account_unit
                    .is_some_and(|unit_id| self.organizational_unit_ids.contains(&unit_id)))
    }
}

/// Repository port for audit log reads.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Lists in-scope audit records newest first.
    async fn list_audit_log(
        &self,
        scope: &AuditLogScope,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogRecord>>;
}

/// Application service for reading committed audit records.
#[derive(Clone)]
pub struct AuditLogService {
    caller_resolver: CallerResolver,
    repository: Arc<dyn AuditLogRepository>,
}

impl AuditLogService {
    /// Creates a new audit log service.
    #[must_use]
    pub fn new(caller_resolver: CallerResolver, repository: Arc<dyn AuditLogRepository>) -> Self {
        Self {
            caller_resolver,
            repository,
        }
    }

    /// Lists the audit records visible to `caller` with paging bounds enforced.
    pub async fn list_audit_log(
        &self,
        caller: &Caller,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogRecord>> {
        let reachable = self
            .caller_resolver
            .reachable_organizational_units(caller)
            .await?;
        let scope = AuditLogScope {
            actor: *caller,
            organizational_unit_ids: reachable.into_iter().collect(),
        };

        let resource_id = query
            .resource_id
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        self.repository
            .list_audit_log(
                &scope,
                AuditLogQuery {
                    limit: query.limit.clamp(1, MAX_AUDIT_LOG_LIMIT),
                    offset: query.offset.min(MAX_AUDIT_LOG_OFFSET),
                    resource_type: query.resource_type,
                    resource_id,
                },
            )
            .await
    }
}
