//! Row shapes shared by the PostgreSQL unit of work and repositories.

use chrono::{DateTime, Utc};
use skyscraper_core::{AppError, AppResult};
use skyscraper_domain::{
    ApiKey, ApiKeyId, AuditLogRecord, AuditResourceType, Caller, CloudAccount, CloudAccountId,
    CloudAccountTags, CloudProvider, OrganizationalUnitId,
};
use sqlx::FromRow;
use sqlx::types::Json;

pub(crate) const API_KEY_COLUMNS: &str = "id, owner, description, system, created_at";

pub(crate) const CLOUD_ACCOUNT_COLUMNS: &str = "id, cloud, tenant_id, account_id, name, \
     organizational_unit_id, tags_current, tags_desired, created_at, updated_at";

pub(crate) const AUDIT_LOG_COLUMNS: &str =
    "id, caller_type, caller_id, resource_type, resource_id, payload, created_at";

#[derive(Debug, FromRow)]
pub(crate) struct ApiKeyRow {
    id: uuid::Uuid,
    owner: String,
    description: Option<String>,
    system: bool,
    created_at: DateTime<Utc>,
}

impl ApiKeyRow {
    pub(crate) fn into_api_key(self) -> AppResult<ApiKey> {
        ApiKey::new(
            ApiKeyId::from_uuid(self.id),
            self.owner,
            self.description,
            self.system,
            self.created_at,
        )
        .map_err(|error| AppError::Internal(format!("invalid persisted api key: {error}")))
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct CloudAccountRow {
    id: uuid::Uuid,
    cloud: String,
    tenant_id: String,
    account_id: String,
    name: String,
    organizational_unit_id: uuid::Uuid,
    tags_current: Json<CloudAccountTags>,
    tags_desired: Json<CloudAccountTags>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CloudAccountRow {
    pub(crate) fn into_cloud_account(self) -> AppResult<CloudAccount> {
        let cloud = self.cloud.parse::<CloudProvider>().map_err(|error| {
            AppError::Internal(format!("invalid persisted cloud account '{}': {error}", self.id))
        })?;

        Ok(CloudAccount {
            id: CloudAccountId::from_uuid(self.id),
            cloud,
            tenant_id: self.tenant_id,
            account_id: self.account_id,
            name: self.name,
            organizational_unit_id: OrganizationalUnitId::from_uuid(self.organizational_unit_id),
            tags_current: self.tags_current.0,
            tags_desired: self.tags_desired.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct AuditLogRow {
    id: i64,
    caller_type: String,
    caller_id: uuid::Uuid,
    resource_type: String,
    resource_id: String,
    payload: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl AuditLogRow {
    /// Decodes the persisted actor, failing closed on unknown caller kinds.
    pub(crate) fn into_record(self) -> AppResult<AuditLogRecord> {
        let actor = Caller::from_parts(self.caller_type.as_str(), self.caller_id)?;
        let resource_type = self
            .resource_type
            .parse::<AuditResourceType>()
            .map_err(|error| {
                AppError::Internal(format!("invalid persisted audit record {}: {error}", self.id))
            })?;

        Ok(AuditLogRecord {
            id: self.id,
            resource_type,
            resource_id: self.resource_id,
            actor,
            payload: self.payload,
            created_at: self.created_at,
        })
    }
}

pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(database_error) if database_error.code().as_deref() == Some("23505")
    )
}
