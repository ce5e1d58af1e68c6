use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use skyscraper_core::{AppError, AppResult};
use uuid::Uuid;

use crate::{ApiKeyId, UserId};

/// Discriminator for the two caller kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerKind {
    /// A human user authenticated through a session.
    User,
    /// A machine client authenticated with an API key.
    ApiKey,
}

impl CallerKind {
    /// Returns a stable storage value for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::ApiKey => "api_key",
        }
    }
}

impl FromStr for CallerKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "api_key" => Ok(Self::ApiKey),
            _ => Err(AppError::UnrecognizedCaller(format!(
                "unknown caller kind '{value}'"
            ))),
        }
    }
}

/// Authenticated identity executing a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Caller {
    /// Human caller.
    User(UserId),
    /// Machine caller.
    ApiKey(ApiKeyId),
}

impl Caller {
    /// Rebuilds a caller from its persisted kind and identifier.
    pub fn from_parts(kind: &str, id: Uuid) -> AppResult<Self> {
        Ok(match CallerKind::from_str(kind)? {
            CallerKind::User => Self::User(UserId::from_uuid(id)),
            CallerKind::ApiKey => Self::ApiKey(ApiKeyId::from_uuid(id)),
        })
    }

    /// Returns the caller kind.
    #[must_use]
    pub fn kind(&self) -> CallerKind {
        match self {
            Self::User(_) => CallerKind::User,
            Self::ApiKey(_) => CallerKind::ApiKey,
        }
    }

    /// Returns the caller identifier without its kind.
    #[must_use]
    pub fn id(&self) -> Uuid {
        match self {
            Self::User(user_id) => user_id.as_uuid(),
            Self::ApiKey(api_key_id) => api_key_id.as_uuid(),
        }
    }
}

impl Display for Caller {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}:{}", self.kind().as_str(), self.id())
    }
}
