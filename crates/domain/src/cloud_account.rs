use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skyscraper_core::{AppError, AppResult};

use crate::{CloudAccountId, OrganizationalUnitId};

/// Maximum number of tags on one cloud account.
pub const MAX_TAGS_PER_ACCOUNT: usize = 50;
/// Maximum tag key length in characters.
pub const MAX_TAG_KEY_LENGTH: usize = 128;
/// Maximum tag value length in characters.
pub const MAX_TAG_VALUE_LENGTH: usize = 256;

/// Tag set keyed by tag name.
pub type CloudAccountTags = BTreeMap<String, String>;

/// Supported cloud providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloudProvider {
    /// Amazon Web Services.
    Aws,
    /// Microsoft Azure.
    Azure,
    /// Google Cloud Platform.
    Gcp,
}

impl CloudProvider {
    /// Returns a stable storage value for this provider.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::Azure => "azure",
            Self::Gcp => "gcp",
        }
    }
}

impl FromStr for CloudProvider {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "aws" => Ok(Self::Aws),
            "azure" => Ok(Self::Azure),
            "gcp" => Ok(Self::Gcp),
            _ => Err(AppError::Validation(format!(
                "unknown cloud provider '{value}'"
            ))),
        }
    }
}

/// Inventoried cloud account owned by exactly one organizational unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudAccount {
    /// Inventory identifier.
    pub id: CloudAccountId,
    /// Provider hosting the account.
    pub cloud: CloudProvider,
    /// Provider-side tenant or organization identifier.
    pub tenant_id: String,
    /// Provider-side account identifier.
    pub account_id: String,
    /// Account display name.
    pub name: String,
    /// Owning organizational unit.
    pub organizational_unit_id: OrganizationalUnitId,
    /// Tags last observed on the provider.
    pub tags_current: CloudAccountTags,
    /// Tags requested through the API.
    pub tags_desired: CloudAccountTags,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl CloudAccount {
    /// Returns whether observed tags differ from requested tags.
    #[must_use]
    pub fn tags_drift_detected(&self) -> bool {
        self.tags_current != self.tags_desired
    }
}

/// Validates a desired tag set before it is persisted.
pub fn validate_tags(tags: &CloudAccountTags) -> AppResult<()> {
    if tags.len() > MAX_TAGS_PER_ACCOUNT {
        return Err(AppError::Validation(format!(
            "tags must contain at most {MAX_TAGS_PER_ACCOUNT} entries"
        )));
    }

    for (key, value) in tags {
        if key.trim().is_empty() {
            return Err(AppError::Validation(
                "tags: key must not be empty".to_owned(),
            ));
        }
        if key.chars().count() > MAX_TAG_KEY_LENGTH {
            return Err(AppError::Validation(format!(
                "tags: key '{key}' exceeds {MAX_TAG_KEY_LENGTH} characters"
            )));
        }
        if value.chars().count() > MAX_TAG_VALUE_LENGTH {
            return Err(AppError::Validation(format!(
                "tags: value for '{key}' exceeds {MAX_TAG_VALUE_LENGTH} characters"
            )));
        }
    }

    Ok(())
}
