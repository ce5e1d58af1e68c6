use std::sync::Arc;

use skyscraper_core::AppError;
use skyscraper_domain::{
    AuditResourceType, Caller, CloudAccountId, CloudAccountTags, OrganizationalUnitId, UserId,
};

use super::CloudAccountService;
use crate::test_support::{FakeStore, cloud_account};
use crate::{AuditRecorder, CallerResolver};

fn service(store: &Arc<FakeStore>) -> CloudAccountService {
    CloudAccountService::new(
        CallerResolver::new(store.clone()),
        store.clone(),
        store.clone(),
        AuditRecorder::new(),
    )
}

#[tokio::test]
async fn assigned_user_sees_exactly_the_accounts_of_their_unit() {
    let store = Arc::new(FakeStore::default());
    let ou_42 = OrganizationalUnitId::new();
    let other_unit = OrganizationalUnitId::new();
    let assigned_user = UserId::new();
    let unassigned_user = UserId::new();
    store.assign_user(assigned_user, ou_42).await;

    let acct_7 = cloud_account("acct-7", ou_42);
    store.insert_cloud_account(acct_7.clone()).await;
    store
        .insert_cloud_account(cloud_account("acct-8", other_unit))
        .await;

    let service = service(&store);

    let visible = service
        .visible_cloud_accounts(&Caller::User(assigned_user))
        .await
        .unwrap_or_default();
    assert_eq!(visible, vec![acct_7]);

    let nothing = service
        .visible_cloud_accounts(&Caller::User(unassigned_user))
        .await;
    assert!(matches!(nothing, Ok(accounts) if accounts.is_empty()));
}

#[tokio::test]
async fn empty_reach_skips_the_account_lookup() {
    let store = Arc::new(FakeStore::default());
    let service = service(&store);

    let visible = service
        .visible_cloud_accounts(&Caller::User(UserId::new()))
        .await;
    assert!(matches!(visible, Ok(accounts) if accounts.is_empty()));
    assert_eq!(store.account_lookups().await, 0);
}

#[tokio::test]
async fn account_outside_reach_is_not_found() {
    let store = Arc::new(FakeStore::default());
    let user_id = UserId::new();
    store.assign_user(user_id, OrganizationalUnitId::new()).await;
    let foreign = cloud_account("acct-9", OrganizationalUnitId::new());
    store.insert_cloud_account(foreign.clone()).await;

    let result = service(&store)
        .find_visible_cloud_account(&Caller::User(user_id), foreign.id)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let missing = service(&store)
        .find_visible_cloud_account(&Caller::User(user_id), CloudAccountId::new())
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn tag_update_commits_with_one_cloud_account_audit_record() {
    let store = Arc::new(FakeStore::default());
    let unit = OrganizationalUnitId::new();
    let user_id = UserId::new();
    store.assign_user(user_id, unit).await;
    let account = cloud_account("acct-7", unit);
    store.insert_cloud_account(account.clone()).await;

    let tags = CloudAccountTags::from([("cost-center".to_owned(), "42".to_owned())]);
    let updated = service(&store)
        .update_cloud_account_tags(&Caller::User(user_id), account.id, tags.clone())
        .await;
    assert!(matches!(&updated, Ok(value) if value.tags_desired == tags));

    let state = store.snapshot().await;
    assert_eq!(state.cloud_accounts[0].tags_desired, tags);
    assert!(state.cloud_accounts[0].tags_drift_detected());
    assert_eq!(state.audit_records.len(), 1);
    assert_eq!(
        state.audit_records[0].resource_type,
        AuditResourceType::CloudAccount
    );
    assert_eq!(state.audit_records[0].resource_id, account.id.to_string());
    assert_eq!(
        state.audit_records[0].payload["tags_desired"]["cost-center"],
        "42"
    );
}

#[tokio::test]
async fn tag_update_on_invisible_account_writes_nothing() {
    let store = Arc::new(FakeStore::default());
    let account = cloud_account("acct-7", OrganizationalUnitId::new());
    store.insert_cloud_account(account.clone()).await;

    let result = service(&store)
        .update_cloud_account_tags(
            &Caller::User(UserId::new()),
            account.id,
            CloudAccountTags::new(),
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(store.begun().await, 0);
    assert!(store.snapshot().await.audit_records.is_empty());
}

#[tokio::test]
async fn audit_failure_reverts_the_tag_update() {
    let store = Arc::new(FakeStore::with_failing_audit_inserts());
    let unit = OrganizationalUnitId::new();
    let user_id = UserId::new();
    store.assign_user(user_id, unit).await;
    let account = cloud_account("acct-7", unit);
    store.insert_cloud_account(account.clone()).await;

    let tags = CloudAccountTags::from([("env".to_owned(), "prod".to_owned())]);
    let result = service(&store)
        .update_cloud_account_tags(&Caller::User(user_id), account.id, tags)
        .await;
    assert!(matches!(result, Err(AppError::Audit(_))));

    let state = store.snapshot().await;
    assert_eq!(state.cloud_accounts[0].tags_desired, account.tags_desired);
    assert!(state.audit_records.is_empty());
}

#[tokio::test]
async fn invalid_tags_are_rejected_up_front() {
    let store = Arc::new(FakeStore::default());
    let tags = CloudAccountTags::from([(String::new(), "value".to_owned())]);

    let result = service(&store)
        .update_cloud_account_tags(&Caller::User(UserId::new()), CloudAccountId::new(), tags)
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}
