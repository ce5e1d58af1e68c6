use std::sync::Arc;

use skyscraper_core::AppError;
use skyscraper_domain::{ApiKeyId, AuditResourceType, Caller, UserId};

use super::{ApiKeyService, IssueApiKeyInput};
use crate::AuditRecorder;
use crate::test_support::{FAKE_PLACEHOLDER_HASH, FakeApiKeyGenerator, FakeStore};

fn service(store: &Arc<FakeStore>, generator: FakeApiKeyGenerator) -> ApiKeyService {
    ApiKeyService::new(
        store.clone(),
        store.clone(),
        Arc::new(generator),
        AuditRecorder::new(),
    )
}

fn nightly_sync_input() -> IssueApiKeyInput {
    IssueApiKeyInput {
        owner: "ci-bot".to_owned(),
        description: Some("nightly sync".to_owned()),
    }
}

#[tokio::test]
async fn issue_api_key_commits_key_with_exactly_one_audit_record() {
    let store = Arc::new(FakeStore::default());
    let service = service(&store, FakeApiKeyGenerator::default());
    let caller = Caller::User(UserId::new());

    let issued = match service.issue_api_key(&caller, nightly_sync_input()).await {
        Ok(issued) => issued,
        Err(error) => panic!("issuance should succeed: {error}"),
    };
    assert!(!issued.token.secret().expose().is_empty());
    assert_eq!(issued.token.api_key_id(), issued.api_key.id());

    let listed = service.list_api_keys().await.unwrap_or_default();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].owner(), "ci-bot");
    assert_eq!(listed[0].description(), Some("nightly sync"));
    assert!(!listed[0].is_system());

    let state = store.snapshot().await;
    assert_eq!(state.audit_records.len(), 1);
    let record = &state.audit_records[0];
    assert_eq!(record.resource_type, AuditResourceType::ApiKey);
    assert_eq!(record.resource_id, issued.api_key.id().to_string());
    assert_eq!(record.actor, caller);
    assert_eq!(record.payload["owner"], "ci-bot");
    assert_eq!(record.payload["description"], "nightly sync");

    let stored_hash = &state.api_keys[0].1;
    assert_ne!(stored_hash.as_str(), issued.token.secret().expose());
}

#[tokio::test]
async fn blank_owner_is_rejected_before_a_unit_of_work_opens() {
    let store = Arc::new(FakeStore::default());
    let service = service(&store, FakeApiKeyGenerator::default());

    let result = service
        .issue_api_key(
            &Caller::User(UserId::new()),
            IssueApiKeyInput {
                owner: "   ".to_owned(),
                description: None,
            },
        )
        .await;

    match result {
        Err(AppError::Validation(message)) => assert!(message.contains("owner")),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(store.begun().await, 0);
}

#[tokio::test]
async fn generator_failure_leaves_no_trace() {
    let store = Arc::new(FakeStore::default());
    let service = service(&store, FakeApiKeyGenerator::failing());

    let result = service
        .issue_api_key(&Caller::User(UserId::new()), nightly_sync_input())
        .await;
    assert!(result.is_err());

    let state = store.snapshot().await;
    assert!(state.api_keys.is_empty());
    assert!(state.audit_records.is_empty());
    assert_eq!(store.rolled_back().await, 1);
}

#[tokio::test]
async fn audit_insert_failure_rolls_back_the_key() {
    let store = Arc::new(FakeStore::with_failing_audit_inserts());
    let service = service(&store, FakeApiKeyGenerator::default());

    let result = service
        .issue_api_key(&Caller::User(UserId::new()), nightly_sync_input())
        .await;
    assert!(matches!(result, Err(AppError::Audit(_))));

    let state = store.snapshot().await;
    assert!(state.api_keys.is_empty());
    assert!(state.audit_records.is_empty());
}

#[tokio::test]
async fn commit_failure_is_reported_and_nothing_persists() {
    let store = Arc::new(FakeStore::with_failing_commits());
    let service = service(&store, FakeApiKeyGenerator::default());

    let result = service
        .issue_api_key(&Caller::User(UserId::new()), nightly_sync_input())
        .await;
    assert!(matches!(result, Err(AppError::Transaction(_))));
    assert!(service.list_api_keys().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn caller_api_key_is_not_found_for_human_callers() {
    let store = Arc::new(FakeStore::default());
    let service = service(&store, FakeApiKeyGenerator::default());

    let result = service.caller_api_key(&Caller::User(UserId::new())).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn issued_token_authenticates_as_machine_caller() {
    let store = Arc::new(FakeStore::default());
    let service = service(&store, FakeApiKeyGenerator::default());

    let Ok(issued) = service
        .issue_api_key(&Caller::User(UserId::new()), nightly_sync_input())
        .await
    else {
        panic!("issuance should succeed");
    };

    let caller = service
        .authenticate(issued.token.to_bearer_value().as_str())
        .await;
    assert!(matches!(caller, Ok(Caller::ApiKey(id)) if id == issued.api_key.id()));

    let own_key = match caller {
        Ok(caller) => service.caller_api_key(&caller).await,
        Err(error) => Err(error),
    };
    assert!(matches!(own_key, Ok(key) if key.owner() == "ci-bot"));

    let wrong_secret = format!("{}.not-the-secret", issued.api_key.id());
    let rejected = service.authenticate(wrong_secret.as_str()).await;
    assert!(matches!(rejected, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn unknown_key_id_is_unauthorized_after_a_placeholder_verification() {
    let store = Arc::new(FakeStore::default());
    let generator = FakeApiKeyGenerator::default();
    let service = service(&store, generator.clone());

    let bearer = format!("{}.whatever", ApiKeyId::new());
    let result = service.authenticate(bearer.as_str()).await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
    assert_eq!(generator.checked_digests().await, vec![FAKE_PLACEHOLDER_HASH]);
}

#[tokio::test]
async fn placeholder_secret_never_authenticates_an_unknown_key() {
    let store = Arc::new(FakeStore::default());
    let generator = FakeApiKeyGenerator::default();
    let service = service(&store, generator.clone());

    let bearer = format!("{}.placeholder", ApiKeyId::new());
    let result = service.authenticate(bearer.as_str()).await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
    assert_eq!(generator.checked_digests().await.len(), 1);
}

#[tokio::test]
async fn known_and_unknown_key_ids_each_run_one_verification() {
    let store = Arc::new(FakeStore::default());
    let generator = FakeApiKeyGenerator::default();
    let service = service(&store, generator.clone());

    let Ok(issued) = service
        .issue_api_key(&Caller::User(UserId::new()), nightly_sync_input())
        .await
    else {
        panic!("issuance should succeed");
    };

    let wrong_secret = format!("{}.not-the-secret", issued.api_key.id());
    let unknown_id = format!("{}.not-the-secret", ApiKeyId::new());
    assert!(service.authenticate(wrong_secret.as_str()).await.is_err());
    assert!(service.authenticate(unknown_id.as_str()).await.is_err());

    let checked = generator.checked_digests().await;
    assert_eq!(checked.len(), 2);
    assert_ne!(checked[0], FAKE_PLACEHOLDER_HASH);
    assert_eq!(checked[1], FAKE_PLACEHOLDER_HASH);
}
