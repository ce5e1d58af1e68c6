//! Transactional boundary shared by every audited mutation.
//!
//! A [`UnitOfWork`] owns one storage transaction. Mutations performed through
//! it stay invisible to other readers until [`UnitOfWork::commit`] succeeds.
//! Dropping an unfinished unit discards its mutations, so an early return
//! or a cancelled request never commits.

use async_trait::async_trait;
use skyscraper_core::{AppError, AppResult};
use skyscraper_domain::{
    ApiKey, AuditLogRecord, AuditResourceType, Caller, CloudAccount, CloudAccountId,
    CloudAccountTags,
};

/// Input for persisting a freshly issued API key.
#[derive(Clone, PartialEq, Eq)]
pub struct NewApiKey {
    /// Free-text owner, already validated.
    pub owner: String,
    /// Optional description, already normalized.
    pub description: Option<String>,
    /// System-issued rather than caller-issued.
    pub system: bool,
    /// One-way digest of the secret.
    pub encoded_hash: String,
}

impl std::fmt::Debug for NewApiKey {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("NewApiKey")
            .field("owner", &self.owner)
            .field("description", &self.description)
            .field("system", &self.system)
            .finish_non_exhaustive()
    }
}

/// Input for appending one audit record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditLogRecord {
    /// Mutated resource family.
    pub resource_type: AuditResourceType,
    /// Mutated resource identifier.
    pub resource_id: String,
    /// Caller that performed the mutation.
    pub actor: Caller,
    /// Serialized change snapshot.
    pub payload: serde_json::Value,
}

/// Lifecycle of a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOfWorkStatus {
    /// Accepting mutations.
    Open,
    /// Mutations were applied.
    Committed,
    /// Mutations were discarded.
    RolledBack,
}

impl UnitOfWorkStatus {
    /// Fails unless the unit still accepts mutations or a commit.
    pub fn ensure_open(self) -> AppResult<()> {
        match self {
            Self::Open => Ok(()),
            Self::Committed => Err(AppError::Transaction(
                "unit of work is already committed".to_owned(),
            )),
            Self::RolledBack => Err(AppError::Transaction(
                "unit of work is already rolled back".to_owned(),
            )),
        }
    }
}

/// One isolated mutation scope bound to a single request.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Persists a new API key and returns its metadata.
    async fn insert_api_key(&mut self, input: NewApiKey) -> AppResult<ApiKey>;

    /// Replaces the desired tags of a cloud account.
    async fn update_cloud_account_tags(
        &mut self,
        cloud_account_id: CloudAccountId,
        tags_desired: CloudAccountTags,
    ) -> AppResult<CloudAccount>;

    /// Appends one audit record.
    async fn insert_audit_record(&mut self, record: NewAuditLogRecord)
    -> AppResult<AuditLogRecord>;

    /// Durably applies every mutation performed through this unit.
    async fn commit(&mut self) -> AppResult<()>;

    /// Discards every mutation performed through this unit.
    ///
    /// Calling this after a successful commit, or twice, is a no-op.
    async fn rollback(&mut self) -> AppResult<()>;
}

/// Opens units of work against the backing store.
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    /// Begins a new unit of work.
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;
}

/// Commits the unit when `outcome` succeeded, rolls it back otherwise.
///
/// A failed rollback is folded into the returned error.
pub async fn complete_unit_of_work<T>(
    mut unit_of_work: Box<dyn UnitOfWork>,
    outcome: AppResult<T>,
) -> AppResult<T> {
    match outcome {
        Ok(value) => {
            unit_of_work.commit().await?;
            Ok(value)
        }
        Err(error) => match unit_of_work.rollback().await {
            Ok(()) => Err(error),
            Err(rollback_error) => Err(AppError::Transaction(format!(
                "{error}; rollback failed: {rollback_error}"
            ))),
        },
    }
}
