use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skyscraper_core::AppError;

use crate::Caller;

/// Resource families that produce audit records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditResourceType {
    /// Machine credentials.
    ApiKey,
    /// Inventoried cloud accounts.
    CloudAccount,
    /// Cloud tenants (organizations, directories).
    CloudTenant,
    /// Organizational units.
    OrganizationalUnit,
    /// Tag definitions.
    Tag,
    /// Human users.
    User,
}

impl AuditResourceType {
    /// Returns a stable storage value for this resource type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiKey => "api_key",
            Self::CloudAccount => "cloud_account",
            Self::CloudTenant => "cloud_tenant",
            Self::OrganizationalUnit => "organizational_unit",
            Self::Tag => "tag",
            Self::User => "user",
        }
    }
}

impl FromStr for AuditResourceType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "api_key" => Ok(Self::ApiKey),
            "cloud_account" => Ok(Self::CloudAccount),
            "cloud_tenant" => Ok(Self::CloudTenant),
            "organizational_unit" => Ok(Self::OrganizationalUnit),
            "tag" => Ok(Self::Tag),
            "user" => Ok(Self::User),
            _ => Err(AppError::Validation(format!(
                "unknown audit resource type '{value}'"
            ))),
        }
    }
}

/// Immutable record proving one committed mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogRecord {
    /// Monotonic record identifier.
    pub id: i64,
    /// Mutated resource family.
    pub resource_type: AuditResourceType,
    /// Mutated resource identifier.
    pub resource_id: String,
    /// Caller that performed the mutation.
    pub actor: Caller,
    /// Snapshot of the requested change.
    pub payload: serde_json::Value,
    /// Record timestamp.
    pub created_at: DateTime<Utc>,
}
