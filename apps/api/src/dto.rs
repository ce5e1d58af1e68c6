//! Transport shapes for the HTTP API.

use serde::{Deserialize, Serialize};
use skyscraper_application::IssuedApiKey;
use skyscraper_domain::{
    ApiKey, AuditLogRecord, CloudAccount, CloudAccountTags, OrganizationalUnitId, User,
};

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct BootstrapRequest {
    pub user_id: String,
    pub token: String,
}

/// API key metadata. Never carries the secret or its digest.
#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    pub id: String,
    pub owner: String,
    pub description: Option<String>,
    pub system: bool,
    pub created_at: String,
}

impl From<ApiKey> for ApiKeyResponse {
    fn from(api_key: ApiKey) -> Self {
        Self {
            id: api_key.id().to_string(),
            owner: api_key.owner().to_owned(),
            description: api_key.description().map(str::to_owned),
            system: api_key.is_system(),
            created_at: api_key.created_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IssueApiKeyRequest {
    pub owner: String,
    pub description: Option<String>,
}

/// Issuance response. `token` is shown exactly once.
#[derive(Debug, Serialize)]
pub struct IssuedApiKeyResponse {
    pub api_key: ApiKeyResponse,
    pub token: String,
}

impl From<IssuedApiKey> for IssuedApiKeyResponse {
    fn from(issued: IssuedApiKey) -> Self {
        Self {
            token: issued.token.to_bearer_value(),
            api_key: ApiKeyResponse::from(issued.api_key),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserProfileResponse {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub groups: Vec<String>,
}

impl From<User> for UserProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            name: user.name,
            email: user.email,
            groups: user.groups,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReachableOrganizationalUnitsResponse {
    pub organizational_unit_ids: Vec<String>,
}

impl FromIterator<OrganizationalUnitId> for ReachableOrganizationalUnitsResponse {
    fn from_iter<I: IntoIterator<Item = OrganizationalUnitId>>(iter: I) -> Self {
        Self {
            organizational_unit_ids: iter.into_iter().map(|id| id.to_string()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CloudAccountResponse {
    pub id: String,
    pub cloud: &'static str,
    pub tenant_id: String,
    pub account_id: String,
    pub name: String,
    pub organizational_unit_id: String,
    pub tags_current: CloudAccountTags,
    pub tags_desired: CloudAccountTags,
    pub tags_drift_detected: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CloudAccount> for CloudAccountResponse {
    fn from(cloud_account: CloudAccount) -> Self {
        Self {
            tags_drift_detected: cloud_account.tags_drift_detected(),
            id: cloud_account.id.to_string(),
            cloud: cloud_account.cloud.as_str(),
            tenant_id: cloud_account.tenant_id,
            account_id: cloud_account.account_id,
            name: cloud_account.name,
            organizational_unit_id: cloud_account.organizational_unit_id.to_string(),
            tags_current: cloud_account.tags_current,
            tags_desired: cloud_account.tags_desired,
            created_at: cloud_account.created_at.to_rfc3339(),
            updated_at: cloud_account.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateCloudAccountTagsRequest {
    pub tags_desired: CloudAccountTags,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuditLogQueryParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuditLogRecordResponse {
    pub id: i64,
    pub resource_type: &'static str,
    pub resource_id: String,
    pub actor_kind: &'static str,
    pub actor_id: String,
    pub payload: serde_json::Value,
    pub created_at: String,
}

impl From<AuditLogRecord> for AuditLogRecordResponse {
    fn from(record: AuditLogRecord) -> Self {
        Self {
            id: record.id,
            resource_type: record.resource_type.as_str(),
            resource_id: record.resource_id,
            actor_kind: record.actor.kind().as_str(),
            actor_id: record.actor.id().to_string(),
            payload: record.payload,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}
