use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skyscraper_core::{AppResult, NonEmptyString};

use crate::ApiKeyId;

/// Machine credential metadata.
///
/// Never carries the secret or its digest, so every read path built on this
/// type is safe to return to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKey {
    id: ApiKeyId,
    owner: NonEmptyString,
    description: Option<String>,
    system: bool,
    created_at: DateTime<Utc>,
}

impl ApiKey {
    /// Creates API key metadata. Blank descriptions are stored as absent.
    pub fn new(
        id: ApiKeyId,
        owner: impl Into<String>,
        description: Option<String>,
        system: bool,
        created_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            owner: NonEmptyString::for_field("owner", owner)?,
            description: normalize_description(description),
            system,
            created_at,
        })
    }

    /// Returns the key identifier.
    #[must_use]
    pub fn id(&self) -> ApiKeyId {
        self.id
    }

    /// Returns the free-text owner.
    #[must_use]
    pub fn owner(&self) -> &str {
        self.owner.as_str()
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns whether the key was issued by the system rather than a caller.
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.system
    }

    /// Returns the issuance timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Trims a description and drops it when nothing remains.
#[must_use]
pub fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
