//! In-memory store with the same transactional semantics as PostgreSQL.
//!
//! Units of work stage their writes privately and apply them under one write
//! lock on commit. A dropped or rolled-back unit leaves the store untouched.
//! Audit identifiers come from a shared sequence, so rolled-back units leave
//! gaps the way a `BIGSERIAL` does.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use skyscraper_application::{
    ApiKeyRepository, AuditLogQuery, AuditLogRepository, AuditLogScope, CloudAccountRepository,
    NewApiKey, NewAuditLogRecord, OrganizationalUnitRepository, StoredApiKeyCredential,
    UnitOfWork, UnitOfWorkFactory, UnitOfWorkStatus, UserRepository,
};
use skyscraper_core::{AppError, AppResult};
use skyscraper_domain::{
    ApiKey, ApiKeyId, AuditLogRecord, CloudAccount, CloudAccountId, CloudAccountTags,
    OrganizationalUnit, OrganizationalUnitId, User, UserId, expand_with_descendants,
};

#[derive(Debug, Clone)]
struct StoredApiKey {
    api_key: ApiKey,
    encoded_hash: String,
}

#[derive(Debug, Default)]
struct InMemoryState {
    users: BTreeMap<UserId, User>,
    organizational_units: Vec<OrganizationalUnit>,
    user_assignments: BTreeMap<UserId, BTreeSet<OrganizationalUnitId>>,
    group_assignments: BTreeMap<String, BTreeSet<OrganizationalUnitId>>,
    api_key_assignments: BTreeMap<ApiKeyId, BTreeSet<OrganizationalUnitId>>,
    api_keys: Vec<StoredApiKey>,
    cloud_accounts: BTreeMap<CloudAccountId, CloudAccount>,
    audit_records: Vec<AuditLogRecord>,
}

impl InMemoryState {
    fn digest_exists(&self, encoded_hash: &str) -> bool {
        self.api_keys
            .iter()
            .any(|stored| stored.encoded_hash == encoded_hash)
    }
}

/// In-memory implementation of every storage port.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<InMemoryState>>,
    audit_sequence: Arc<AtomicI64>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user profile.
    pub async fn insert_user(&self, user: User) {
        self.state.write().await.users.insert(user.id, user);
    }

    /// Inserts an organizational unit.
    pub async fn insert_organizational_unit(&self, unit: OrganizationalUnit) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state
            .organizational_units
            .iter()
            .any(|existing| existing.id == unit.id)
        {
            return Err(AppError::Conflict(format!(
                "organizational unit '{}' already exists",
                unit.id
            )));
        }

        state.organizational_units.push(unit);
        Ok(())
    }

    /// Assigns a unit directly to a user.
    pub async fn assign_user(&self, user_id: UserId, unit_id: OrganizationalUnitId) {
        self.state
            .write()
            .await
            .user_assignments
            .entry(user_id)
            .or_default()
            .insert(unit_id);
    }

    /// Assigns a unit to every member of a group.
    pub async fn assign_group(&self, group_name: &str, unit_id: OrganizationalUnitId) {
        self.state
            .write()
            .await
            .group_assignments
            .entry(group_name.to_owned())
            .or_default()
            .insert(unit_id);
    }

    /// Binds a unit to an API key.
    pub async fn assign_api_key(&self, api_key_id: ApiKeyId, unit_id: OrganizationalUnitId) {
        self.state
            .write()
            .await
            .api_key_assignments
            .entry(api_key_id)
            .or_default()
            .insert(unit_id);
    }

    /// Inserts a cloud account as discovered by inventory synchronisation.
    pub async fn insert_cloud_account(&self, cloud_account: CloudAccount) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.cloud_accounts.contains_key(&cloud_account.id) {
            return Err(AppError::Conflict(format!(
                "cloud account '{}' already exists",
                cloud_account.id
            )));
        }

        state
            .cloud_accounts
            .insert(cloud_account.id, cloud_account);
        Ok(())
    }

    async fn reachable_from(
        &self,
        assigned: BTreeSet<OrganizationalUnitId>,
    ) -> Vec<OrganizationalUnitId> {
        let state = self.state.read().await;
        expand_with_descendants(assigned, &state.organizational_units)
            .into_iter()
            .collect()
    }
}

#[derive(Debug)]
struct StagedTagUpdate {
    cloud_account_id: CloudAccountId,
    tags_desired: CloudAccountTags,
}

/// One in-memory unit of work.
pub struct InMemoryUnitOfWork {
    state: Arc<RwLock<InMemoryState>>,
    audit_sequence: Arc<AtomicI64>,
    status: UnitOfWorkStatus,
    api_keys: Vec<StoredApiKey>,
    tag_updates: Vec<StagedTagUpdate>,
    audit_records: Vec<AuditLogRecord>,
}

impl InMemoryUnitOfWork {
    fn staged_cloud_account(&self, committed: &CloudAccount) -> CloudAccount {
        let mut cloud_account = committed.clone();
        if let Some(update) = self
            .tag_updates
            .iter()
            .rev()
            .find(|update| update.cloud_account_id == committed.id)
        {
            cloud_account.tags_desired = update.tags_desired.clone();
        }

        cloud_account
    }
}

#[async_trait]
impl UnitOfWorkFactory for InMemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        debug!("in-memory unit of work started");
        Ok(Box::new(InMemoryUnitOfWork {
            state: self.state.clone(),
            audit_sequence: self.audit_sequence.clone(),
            status: UnitOfWorkStatus::Open,
            api_keys: Vec::new(),
            tag_updates: Vec::new(),
            audit_records: Vec::new(),
        }))
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn insert_api_key(&mut self, input: NewApiKey) -> AppResult<ApiKey> {
        self.status.ensure_open()?;

        let duplicate = self
            .api_keys
            .iter()
            .any(|stored| stored.encoded_hash == input.encoded_hash)
            || self.state.read().await.digest_exists(&input.encoded_hash);
        if duplicate {
            return Err(AppError::Conflict(
                "api key digest already exists".to_owned(),
            ));
        }

        let api_key = ApiKey::new(
            ApiKeyId::new(),
            input.owner,
            input.description,
            input.system,
            Utc::now(),
        )?;
        self.api_keys.push(StoredApiKey {
            api_key: api_key.clone(),
            encoded_hash: input.encoded_hash,
        });

        Ok(api_key)
    }

    async fn update_cloud_account_tags(
        &mut self,
        cloud_account_id: CloudAccountId,
        tags_desired: CloudAccountTags,
    ) -> AppResult<CloudAccount> {
        self.status.ensure_open()?;

        let committed = self
            .state
            .read()
            .await
            .cloud_accounts
            .get(&cloud_account_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("cloud account '{cloud_account_id}'")))?;

        self.tag_updates.push(StagedTagUpdate {
            cloud_account_id,
            tags_desired,
        });
        let mut cloud_account = self.staged_cloud_account(&committed);
        cloud_account.updated_at = Utc::now();

        Ok(cloud_account)
    }

    async fn insert_audit_record(
        &mut self,
        record: NewAuditLogRecord,
    ) -> AppResult<AuditLogRecord> {
        self.status.ensure_open()?;

        let record = AuditLogRecord {
            id: self.audit_sequence.fetch_add(1, Ordering::SeqCst) + 1,
            resource_type: record.resource_type,
            resource_id: record.resource_id,
            actor: record.actor,
            payload: record.payload,
            created_at: Utc::now(),
        };
        self.audit_records.push(record.clone());

        Ok(record)
    }

    async fn commit(&mut self) -> AppResult<()> {
        self.status.ensure_open()?;

        let mut state = self.state.write().await;
        if let Some(duplicate) = self
            .api_keys
            .iter()
            .find(|stored| state.digest_exists(&stored.encoded_hash))
        {
            self.status = UnitOfWorkStatus::RolledBack;
            return Err(AppError::Transaction(format!(
                "api key '{}' conflicts with a committed digest",
                duplicate.api_key.id()
            )));
        }

        let now = Utc::now();
        for update in self.tag_updates.drain(..) {
            if let Some(cloud_account) = state.cloud_accounts.get_mut(&update.cloud_account_id) {
                cloud_account.tags_desired = update.tags_desired;
                cloud_account.updated_at = now;
            }
        }
        state.api_keys.append(&mut self.api_keys);
        state.audit_records.append(&mut self.audit_records);

        self.status = UnitOfWorkStatus::Committed;
        debug!("in-memory unit of work committed");
        Ok(())
    }

    async fn rollback(&mut self) -> AppResult<()> {
        if self.status != UnitOfWorkStatus::Open {
            return Ok(());
        }

        self.api_keys.clear();
        self.tag_updates.clear();
        self.audit_records.clear();
        self.status = UnitOfWorkStatus::RolledBack;
        debug!("in-memory unit of work rolled back");
        Ok(())
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryStore {
    async fn list_api_keys(&self) -> AppResult<Vec<ApiKey>> {
        Ok(self
            .state
            .read()
            .await
            .api_keys
            .iter()
            .map(|stored| stored.api_key.clone())
            .collect())
    }

    async fn find_api_key(&self, api_key_id: ApiKeyId) -> AppResult<Option<ApiKey>> {
        Ok(self
            .state
            .read()
            .await
            .api_keys
            .iter()
            .find(|stored| stored.api_key.id() == api_key_id)
            .map(|stored| stored.api_key.clone()))
    }

    async fn find_api_key_credential(
        &self,
        api_key_id: ApiKeyId,
    ) -> AppResult<Option<StoredApiKeyCredential>> {
        Ok(self
            .state
            .read()
            .await
            .api_keys
            .iter()
            .find(|stored| stored.api_key.id() == api_key_id)
            .map(|stored| StoredApiKeyCredential {
                api_key_id,
                encoded_hash: stored.encoded_hash.clone(),
            }))
    }
}

#[async_trait]
impl OrganizationalUnitRepository for InMemoryStore {
    async fn user_organizational_units(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<OrganizationalUnitId>> {
        let assigned = {
            let state = self.state.read().await;
            let mut assigned = state
                .user_assignments
                .get(&user_id)
                .cloned()
                .unwrap_or_default();

            if let Some(user) = state.users.get(&user_id) {
                for group in &user.groups {
                    if let Some(units) = state.group_assignments.get(group) {
                        assigned.extend(units.iter().copied());
                    }
                }
            }

            assigned
        };

        Ok(self.reachable_from(assigned).await)
    }

    async fn api_key_organizational_units(
        &self,
        api_key_id: ApiKeyId,
    ) -> AppResult<Vec<OrganizationalUnitId>> {
        let assigned = self
            .state
            .read()
            .await
            .api_key_assignments
            .get(&api_key_id)
            .cloned()
            .unwrap_or_default();

        Ok(self.reachable_from(assigned).await)
    }
}

#[async_trait]
impl CloudAccountRepository for InMemoryStore {
    async fn cloud_accounts_by_organizational_units(
        &self,
        organizational_unit_ids: &[OrganizationalUnitId],
    ) -> AppResult<Vec<CloudAccount>> {
        let state = self.state.read().await;
        let mut cloud_accounts: Vec<CloudAccount> = state
            .cloud_accounts
            .values()
            .filter(|account| organizational_unit_ids.contains(&account.organizational_unit_id))
            .cloned()
            .collect();
        cloud_accounts.sort_by(|left, right| {
            left.created_at
                .cmp(&right.created_at)
                .then_with(|| left.id.cmp(&right.id))
        });

        Ok(cloud_accounts)
    }

    async fn find_cloud_account(
        &self,
        cloud_account_id: CloudAccountId,
    ) -> AppResult<Option<CloudAccount>> {
        Ok(self
            .state
            .read()
            .await
            .cloud_accounts
            .get(&cloud_account_id)
            .cloned())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryStore {
    async fn list_audit_log(
        &self,
        scope: &AuditLogScope,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogRecord>> {
        let state = self.state.read().await;
        let mut records: Vec<&AuditLogRecord> = state
            .audit_records
            .iter()
            .filter(|record| {
                let cloud_account_unit = CloudAccountId::parse(record.resource_id.as_str())
                    .ok()
                    .and_then(|cloud_account_id| state.cloud_accounts.get(&cloud_account_id))
                    .map(|cloud_account| cloud_account.organizational_unit_id);
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
            .collect();
        records.sort_by(|left, right| right.id.cmp(&left.id));

        Ok(records
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }
}
