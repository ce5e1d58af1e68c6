//! Application services and ports.
//!
//! Every audited mutation runs inside one [`UnitOfWork`]: the mutation and
//! its audit record commit together or not at all.

#![forbid(unsafe_code)]

mod api_key_service;
mod audit_log_service;
mod audit_recorder;
mod caller_resolver;
mod cloud_account_service;
mod credential;
mod unit_of_work;
mod user_service;

#[cfg(test)]
mod test_support;

pub use api_key_service::{
    ApiKeyRepository, ApiKeyService, IssueApiKeyInput, IssuedApiKey, StoredApiKeyCredential,
};
pub use audit_log_service::{
    AuditLogQuery, AuditLogRepository, AuditLogScope, AuditLogService, MAX_AUDIT_LOG_LIMIT,
    MAX_AUDIT_LOG_OFFSET,
};
pub use audit_recorder::AuditRecorder;
pub use caller_resolver::{CallerResolver, OrganizationalUnitRepository};
pub use cloud_account_service::{CloudAccountRepository, CloudAccountService};
pub use credential::{ApiKeyGenerator, ApiKeySecret, ApiKeyToken, GeneratedApiKey};
pub use unit_of_work::{
    NewApiKey, NewAuditLogRecord, UnitOfWork, UnitOfWorkFactory, UnitOfWorkStatus,
    complete_unit_of_work,
};
pub use user_service::{UserRepository, UserService};
