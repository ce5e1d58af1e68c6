use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Human user synchronised from the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: UserId,
    /// Login name at the identity provider.
    pub username: String,
    /// Display name, when known.
    pub name: Option<String>,
    /// Email address, when known.
    pub email: Option<String>,
    /// Identity provider group names, used for group-based unit assignment.
    pub groups: Vec<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
