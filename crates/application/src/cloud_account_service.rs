//! Caller-scoped cloud account reads and audited tag updates.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use skyscraper_core::{AppError, AppResult};
use skyscraper_domain::{
    AuditResourceType, Caller, CloudAccount, CloudAccountId, CloudAccountTags,
    OrganizationalUnitId, validate_tags,
};

use crate::{
    AuditRecorder, CallerResolver, UnitOfWork, UnitOfWorkFactory, complete_unit_of_work,
};

/// Repository port for cloud account reads.
#[async_trait]
pub trait CloudAccountRepository: Send + Sync {
    /// Lists accounts owned by any of the given units in one batch lookup.
    async fn cloud_accounts_by_organizational_units(
        &self,
        organizational_unit_ids: &[OrganizationalUnitId],
    ) -> AppResult<Vec<CloudAccount>>;

    /// Finds one account by identifier.
    async fn find_cloud_account(
        &self,
        cloud_account_id: CloudAccountId,
    ) -> AppResult<Option<CloudAccount>>;
}

#[derive(Serialize)]
struct CloudAccountTagsAuditPayload<'a> {
    tags_desired: &'a CloudAccountTags,
}

/// Application service for cloud accounts visible to a caller.
#[derive(Clone)]
pub struct CloudAccountService {
    caller_resolver: CallerResolver,
    repository: Arc<dyn CloudAccountRepository>,
    unit_of_work_factory: Arc<dyn UnitOfWorkFactory>,
    audit_recorder: AuditRecorder,
}

impl CloudAccountService {
    /// Creates a new cloud account service.
    #[must_use]
    pub fn new(
        caller_resolver: CallerResolver,
        repository: Arc<dyn CloudAccountRepository>,
        unit_of_work_factory: Arc<dyn UnitOfWorkFactory>,
        audit_recorder: AuditRecorder,
    ) -> Self {
        Self {
            caller_resolver,
            repository,
            unit_of_work_factory,
            audit_recorder,
        }
    }

    /// Returns exactly the accounts whose owning unit the caller can reach.
    pub async fn visible_cloud_accounts(&self, caller: &Caller) -> AppResult<Vec<CloudAccount>> {
        let reachable = self
            .caller_resolver
            .reachable_organizational_units(caller)
            .await?;
        if reachable.is_empty() {
            return Ok(Vec::new());
        }

        let organizational_unit_ids: Vec<OrganizationalUnitId> =
            reachable.iter().copied().collect();
        let mut cloud_accounts = self
            .repository
            .cloud_accounts_by_organizational_units(&organizational_unit_ids)
            .await?;
        cloud_accounts.retain(|account| reachable.contains(&account.organizational_unit_id));

        Ok(cloud_accounts)
    }

    /// Returns one account if the caller can reach its owning unit.
    ///
    /// Accounts outside the caller's reach are reported as missing.
    pub async fn find_visible_cloud_account(
        &self,
        caller: &Caller,
        cloud_account_id: CloudAccountId,
    ) -> AppResult<CloudAccount> {
        let not_found = || AppError::NotFound(format!("cloud account '{cloud_account_id}'"));

        let cloud_account = self
            .repository
            .find_cloud_account(cloud_account_id)
            .await?
            .ok_or_else(not_found)?;

        let reachable = self
            .caller_resolver
            .reachable_organizational_units(caller)
            .await?;
        if !reachable.contains(&cloud_account.organizational_unit_id) {
            return Err(not_found());
        }

        Ok(cloud_account)
    }

    /// Replaces the desired tags of a visible account and audits the change.
    pub async fn update_cloud_account_tags(
        &self,
        caller: &Caller,
        cloud_account_id: CloudAccountId,
        tags_desired: CloudAccountTags,
    ) -> AppResult<CloudAccount> {
        validate_tags(&tags_desired)?;
        self.find_visible_cloud_account(caller, cloud_account_id)
            .await?;

        let mut unit_of_work = self.unit_of_work_factory.begin().await?;
        let outcome = self
            .update_tags_within(unit_of_work.as_mut(), caller, cloud_account_id, tags_desired)
            .await;

        complete_unit_of_work(unit_of_work, outcome).await
    }

    async fn update_tags_within(
        &self,
        unit_of_work: &mut dyn UnitOfWork,
        caller: &Caller,
        cloud_account_id: CloudAccountId,
        tags_desired: CloudAccountTags,
    ) -> AppResult<CloudAccount> {
        let cloud_account = unit_of_work
            .update_cloud_account_tags(cloud_account_id, tags_desired)
            .await?;

        self.audit_recorder
            .record(
                unit_of_work,
                caller,
                AuditResourceType::CloudAccount,
                cloud_account.id.to_string(),
                &CloudAccountTagsAuditPayload {
                    tags_desired: &cloud_account.tags_desired,
                },
            )
            .await?;

        Ok(cloud_account)
    }
}

#[cfg(test)]
mod tests;
