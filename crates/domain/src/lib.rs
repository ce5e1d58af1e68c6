//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod api_key;
mod audit;
mod caller;
mod cloud_account;
mod ids;
mod organization;
mod user;

pub use api_key::{ApiKey, normalize_description};
pub use audit::{AuditLogRecord, AuditResourceType};
pub use caller::{Caller, CallerKind};
pub use cloud_account::{
    CloudAccount, CloudAccountTags, CloudProvider, MAX_TAG_KEY_LENGTH, MAX_TAG_VALUE_LENGTH,
    MAX_TAGS_PER_ACCOUNT, validate_tags,
};
pub use ids::{ApiKeyId, CloudAccountId, OrganizationalUnitId, UserId};
pub use organization::{OrganizationalUnit, expand_with_descendants};
pub use user::User;
