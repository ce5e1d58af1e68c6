//! In-process fakes shared by the service tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use skyscraper_core::{AppError, AppResult};
use skyscraper_domain::{
    ApiKey, ApiKeyId, AuditLogRecord, CloudAccount, CloudAccountId, CloudAccountTags,
    CloudProvider, OrganizationalUnitId, User, UserId,
};
use tokio::sync::Mutex;

use crate::{
    ApiKeyGenerator, ApiKeyRepository, ApiKeySecret, AuditLogQuery, AuditLogRepository,
    AuditLogScope, CloudAccountRepository, GeneratedApiKey, NewApiKey, NewAuditLogRecord,
    OrganizationalUnitRepository, StoredApiKeyCredential, UnitOfWork, UnitOfWorkFactory,
    UnitOfWorkStatus, UserRepository,
};

/// Committed state of the fake store.
#[derive(Debug, Clone, Default)]
pub struct FakeState {
    pub api_keys: Vec<(ApiKey, String)>,
    pub audit_records: Vec<AuditLogRecord>,
    pub cloud_accounts: Vec<CloudAccount>,
    pub users: Vec<User>,
    pub user_units: BTreeMap<UserId, BTreeSet<OrganizationalUnitId>>,
    pub api_key_units: BTreeMap<ApiKeyId, BTreeSet<OrganizationalUnitId>>,
    next_audit_id: i64,
}

#[derive(Debug, Default)]
struct FakeCounters {
    begun: usize,
    rolled_back: usize,
    account_lookups: usize,
    audit_queries: Vec<AuditLogQuery>,
}

/// Store fake that stages unit-of-work writes on a private copy.
#[derive(Default)]
pub struct FakeStore {
    state: Arc<Mutex<FakeState>>,
    counters: Arc<Mutex<FakeCounters>>,
    fail_audit_inserts: bool,
    fail_commits: bool,
    fail_rollbacks: bool,
}

impl FakeStore {
    pub fn with_failing_audit_inserts() -> Self {
        Self {
            fail_audit_inserts: true,
            ..Self::default()
        }
    }

    pub fn with_failing_commits() -> Self {
        Self {
            fail_commits: true,
            ..Self::default()
        }
    }

    pub fn with_failing_audit_inserts_and_rollbacks() -> Self {
        Self {
            fail_audit_inserts: true,
            fail_rollbacks: true,
            ..Self::default()
        }
    }

    pub async fn snapshot(&self) -> FakeState {
        self.state.lock().await.clone()
    }

    pub async fn begun(&self) -> usize {
        self.counters.lock().await.begun
    }

    pub async fn rolled_back(&self) -> usize {
        self.counters.lock().await.rolled_back
    }

    pub async fn account_lookups(&self) -> usize {
        self.counters.lock().await.account_lookups
    }

    pub async fn audit_queries(&self) -> Vec<AuditLogQuery> {
        self.counters.lock().await.audit_queries.clone()
    }

    pub async fn assign_user(&self, user_id: UserId, unit_id: OrganizationalUnitId) {
        self.state
            .lock()
            .await
            .user_units
            .entry(user_id)
            .or_default()
            .insert(unit_id);
    }

    pub async fn assign_api_key(&self, api_key_id: ApiKeyId, unit_id: OrganizationalUnitId) {
        self.state
            .lock()
            .await
            .api_key_units
            .entry(api_key_id)
            .or_default()
            .insert(unit_id);
    }

    pub async fn insert_cloud_account(&self, cloud_account: CloudAccount) {
        self.state.lock().await.cloud_accounts.push(cloud_account);
    }

    pub async fn insert_user(&self, user: User) {
        self.state.lock().await.users.push(user);
    }
}

struct FakeUnitOfWork {
    committed: Arc<Mutex<FakeState>>,
    counters: Arc<Mutex<FakeCounters>>,
    staged: FakeState,
    status: UnitOfWorkStatus,
    fail_audit_inserts: bool,
    fail_commits: bool,
    fail_rollbacks: bool,
}

#[async_trait]
impl UnitOfWorkFactory for FakeStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        self.counters.lock().await.begun += 1;
        let staged = self.state.lock().await.clone();

        Ok(Box::new(FakeUnitOfWork {
            committed: self.state.clone(),
            counters: self.counters.clone(),
            staged,
            status: UnitOfWorkStatus::Open,
            fail_audit_inserts: self.fail_audit_inserts,
            fail_commits: self.fail_commits,
            fail_rollbacks: self.fail_rollbacks,
        }))
    }
}

#[async_trait]
impl UnitOfWork for FakeUnitOfWork {
    async fn insert_api_key(&mut self, input: NewApiKey) -> AppResult<ApiKey> {
        self.status.ensure_open()?;
        let api_key = ApiKey::new(
            ApiKeyId::new(),
            input.owner,
            input.description,
            input.system,
            Utc::now(),
        )?;
        self.staged
            .api_keys
            .push((api_key.clone(), input.encoded_hash));
        Ok(api_key)
    }

    async fn update_cloud_account_tags(
        &mut self,
        cloud_account_id: CloudAccountId,
        tags_desired: CloudAccountTags,
    ) -> AppResult<CloudAccount> {
        self.status.ensure_open()?;
        let cloud_account = self
            .staged
            .cloud_accounts
            .iter_mut()
            .find(|account| account.id == cloud_account_id)
            .ok_or_else(|| AppError::NotFound(format!("cloud account '{cloud_account_id}'")))?;
        cloud_account.tags_desired = tags_desired;
        cloud_account.updated_at = Utc::now();
        Ok(cloud_account.clone())
    }

    async fn insert_audit_record(
        &mut self,
        record: NewAuditLogRecord,
    ) -> AppResult<AuditLogRecord> {
        self.status.ensure_open()?;
        if self.fail_audit_inserts {
            return Err(AppError::Internal("audit table unavailable".to_owned()));
        }

        self.staged.next_audit_id += 1;
        let record = AuditLogRecord {
            id: self.staged.next_audit_id,
            resource_type: record.resource_type,
            resource_id: record.resource_id,
            actor: record.actor,
            payload: record.payload,
            created_at: Utc::now(),
        };
        self.staged.audit_records.push(record.clone());
        Ok(record)
    }

    async fn commit(&mut self) -> AppResult<()> {
        self.status.ensure_open()?;
        if self.fail_commits {
            self.status = UnitOfWorkStatus::RolledBack;
            return Err(AppError::Transaction("commit rejected".to_owned()));
        }

        *self.committed.lock().await = std::mem::take(&mut self.staged);
        self.status = UnitOfWorkStatus::Committed;
        Ok(())
    }

    async fn rollback(&mut self) -> AppResult<()> {
        if self.status != UnitOfWorkStatus::Open {
            return Ok(());
        }

        self.staged = FakeState::default();
        self.status = UnitOfWorkStatus::RolledBack;
        if self.fail_rollbacks {
            return Err(AppError::Transaction("connection reset".to_owned()));
        }
        self.counters.lock().await.rolled_back += 1;
        Ok(())
    }
}

#[async_trait]
impl ApiKeyRepository for FakeStore {
    async fn list_api_keys(&self) -> AppResult<Vec<ApiKey>> {
        Ok(self
            .state
            .lock()
            .await
            .api_keys
            .iter()
            .map(|(api_key, _)| api_key.clone())
            .collect())
    }

    async fn find_api_key(&self, api_key_id: ApiKeyId) -> AppResult<Option<ApiKey>> {
        Ok(self
            .state
            .lock()
            .await
            .api_keys
            .iter()
            .find(|(api_key, _)| api_key.id() == api_key_id)
            .map(|(api_key, _)| api_key.clone()))
    }

    async fn find_api_key_credential(
        &self,
        api_key_id: ApiKeyId,
    ) -> AppResult<Option<StoredApiKeyCredential>> {
        Ok(self
            .state
            .lock()
            .await
            .api_keys
            .iter()
            .find(|(api_key, _)| api_key.id() == api_key_id)
            .map(|(api_key, encoded_hash)| StoredApiKeyCredential {
                api_key_id: api_key.id(),
                encoded_hash: encoded_hash.clone(),
            }))
    }
}

#[async_trait]
impl OrganizationalUnitRepository for FakeStore {
    async fn user_organizational_units(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<OrganizationalUnitId>> {
        Ok(self
            .state
            .lock()
            .await
            .user_units
            .get(&user_id)
            .map(|units| units.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn api_key_organizational_units(
        &self,
        api_key_id: ApiKeyId,
    ) -> AppResult<Vec<OrganizationalUnitId>> {
        Ok(self
            .state
            .lock()
            .await
            .api_key_units
            .get(&api_key_id)
            .map(|units| units.iter().copied().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl CloudAccountRepository for FakeStore {
    async fn cloud_accounts_by_organizational_units(
        &self,
        organizational_unit_ids: &[OrganizationalUnitId],
    ) -> AppResult<Vec<CloudAccount>> {
        self.counters.lock().await.account_lookups += 1;
        Ok(self
            .state
            .lock()
            .await
            .cloud_accounts
            .iter()
            .filter(|account| organizational_unit_ids.contains(&account.organizational_unit_id))
            .cloned()
            .collect())
    }

    async fn find_cloud_account(
        &self,
        cloud_account_id: CloudAccountId,
    ) -> AppResult<Option<CloudAccount>> {
        Ok(self
            .state
            .lock()
            .await
            .cloud_accounts
            .iter()
            .find(|account| account.id == cloud_account_id)
            .cloned())
    }
}

#[async_trait]
impl UserRepository for FakeStore {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .iter()
            .find(|user| user.id == user_id)
            .cloned())
    }
}

#[async_trait]
impl AuditLogRepository for FakeStore {
    async fn list_audit_log(
        &self,
        scope: &AuditLogScope,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogRecord>> {
        self.counters
            .lock()
            .await
            .audit_queries
            .push(query.clone());

        let state = self.state.lock().await;
        let mut records: Vec<AuditLogRecord> = state
            .audit_records
            .iter()
            .filter(|record| {
                let cloud_account_unit = state
                    .cloud_accounts
                    .iter()
                    .find(|account| account.id.to_string() == record.resource_id)
                    .map(|account| account.organizational_unit_id);
                scope.includes(record, cloud_account_unit)
            })
            .filter(|record| {
                query
                    .resource_type
                    .is_none_or(|resource_type| record.resource_type == resource_type)
            })
            .filter(|record| {
                query
                    .resource_id
                    .as_deref()
                    .is_none_or(|resource_id| record.resource_id == resource_id)
            })
            .cloned()
            .collect();
        records.sort_by(|left, right| right.id.cmp(&left.id));

        Ok(records
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }
}

/// Digest the fake generator hands out for unknown keys.
pub const FAKE_PLACEHOLDER_HASH: &str = "fake-hash:placeholder";

/// Generator fake whose digest is a readable prefix of the secret.
#[derive(Clone, Default)]
pub struct FakeApiKeyGenerator {
    fail: bool,
    checked_digests: Arc<Mutex<Vec<String>>>,
}

impl FakeApiKeyGenerator {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Digests passed to `verify`, in call order.
    pub async fn checked_digests(&self) -> Vec<String> {
        self.checked_digests.lock().await.clone()
    }
}

#[async_trait]
impl ApiKeyGenerator for FakeApiKeyGenerator {
    async fn generate(&self) -> AppResult<GeneratedApiKey> {
        if self.fail {
            return Err(AppError::Internal("entropy source unavailable".to_owned()));
        }

        let secret = uuid::Uuid::new_v4().simple().to_string();
        Ok(GeneratedApiKey {
            encoded_hash: format!("fake-hash:{secret}"),
            secret: ApiKeySecret::new(secret),
        })
    }

    async fn verify(&self, candidate: &str, encoded_hash: &str) -> AppResult<bool> {
        self.checked_digests
            .lock()
            .await
            .push(encoded_hash.to_owned());
        Ok(encoded_hash == format!("fake-hash:{candidate}"))
    }

    fn placeholder_hash(&self) -> &str {
        FAKE_PLACEHOLDER_HASH
    }
}

pub fn cloud_account(name: &str, organizational_unit_id: OrganizationalUnitId) -> CloudAccount {
    let now = Utc::now();
    CloudAccount {
        id: CloudAccountId::new(),
        cloud: CloudProvider::Aws,
        tenant_id: "o-root".to_owned(),
        account_id: format!("{name}-id"),
        name: name.to_owned(),
        organizational_unit_id,
        tags_current: CloudAccountTags::new(),
        tags_desired: CloudAccountTags::new(),
        created_at: now,
        updated_at: now,
    }
}

pub fn user(username: &str) -> User {
    User {
        id: UserId::new(),
        username: username.to_owned(),
        name: None,
        email: Some(format!("{username}@example.com")),
        groups: Vec::new(),
        created_at: Utc::now(),
    }
}
