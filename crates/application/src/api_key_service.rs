//! API key issuance, listing and authentication.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use skyscraper_core::{AppError, AppResult, NonEmptyString};
use skyscraper_domain::{ApiKey, ApiKeyId, AuditResourceType, Caller, normalize_description};

use crate::{
    ApiKeyGenerator, ApiKeyToken, AuditRecorder, NewApiKey, UnitOfWork, UnitOfWorkFactory,
    complete_unit_of_work,
};

/// Stored digest for one API key, only used for verification.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredApiKeyCredential {
    /// Key identifier.
    pub api_key_id: ApiKeyId,
    /// Salted one-way digest of the secret.
    pub encoded_hash: String,
}

/// Repository port for API key reads.
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    /// Lists every API key, metadata only.
    async fn list_api_keys(&self) -> AppResult<Vec<ApiKey>>;

    /// Finds one API key by identifier.
    async fn find_api_key(&self, api_key_id: ApiKeyId) -> AppResult<Option<ApiKey>>;

    /// Loads the stored digest of one API key.
    async fn find_api_key_credential(
        &self,
        api_key_id: ApiKeyId,
    ) -> AppResult<Option<StoredApiKeyCredential>>;
}

/// Input payload for API key issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueApiKeyInput {
    /// Free-text owner.
    pub owner: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Issued key metadata and the one-time bearer token.
#[derive(Debug, Clone)]
pub struct IssuedApiKey {
    /// Persisted key metadata.
    pub api_key: ApiKey,
    /// Bearer token carrying the plaintext secret. Never persisted.
    pub token: ApiKeyToken,
}

#[derive(Serialize)]
struct ApiKeyIssuedAuditPayload<'a> {
    owner: &'a str,
    description: Option<&'a str>,
    system: bool,
}

/// Application service for machine credentials.
#[derive(Clone)]
pub struct ApiKeyService {
    unit_of_work_factory: Arc<dyn UnitOfWorkFactory>,
    repository: Arc<dyn ApiKeyRepository>,
    generator: Arc<dyn ApiKeyGenerator>,
    audit_recorder: AuditRecorder,
}

impl ApiKeyService {
    /// Creates a new API key service.
    #[must_use]
    pub fn new(
        unit_of_work_factory: Arc<dyn UnitOfWorkFactory>,
        repository: Arc<dyn ApiKeyRepository>,
        generator: Arc<dyn ApiKeyGenerator>,
        audit_recorder: AuditRecorder,
    ) -> Self {
        Self {
            unit_of_work_factory,
            repository,
            generator,
            audit_recorder,
        }
    }

    /// Issues a new API key on behalf of `caller`.
    ///
    /// Generation, insert and audit share one unit of work. On any failure
    /// the unit rolls back and no key exists.
    pub async fn issue_api_key(
        &self,
        caller: &Caller,
        input: IssueApiKeyInput,
    ) -> AppResult<IssuedApiKey> {
        let owner = NonEmptyString::for_field("owner", input.owner)?;
        let description = normalize_description(input.description);

        let mut unit_of_work = self.unit_of_work_factory.begin().await?;
        let outcome = self
            .issue_within(unit_of_work.as_mut(), caller, owner, description)
            .await;

        complete_unit_of_work(unit_of_work, outcome).await
    }

    async fn issue_within(
        &self,
        unit_of_work: &mut dyn UnitOfWork,
        caller: &Caller,
        owner: NonEmptyString,
        description: Option<String>,
    ) -> AppResult<IssuedApiKey> {
        let generated = self.generator.generate().await?;

        let api_key = unit_of_work
            .insert_api_key(NewApiKey {
                owner: owner.into(),
                description,
                system: false,
                encoded_hash: generated.encoded_hash,
            })
            .await?;

        self.audit_recorder
            .record(
                unit_of_work,
                caller,
                AuditResourceType::ApiKey,
                api_key.id().to_string(),
                &ApiKeyIssuedAuditPayload {
                    owner: api_key.owner(),
                    description: api_key.description(),
                    system: api_key.is_system(),
                },
            )
            .await?;

        Ok(IssuedApiKey {
            token: ApiKeyToken::new(api_key.id(), generated.secret),
            api_key,
        })
    }

    /// Lists API key metadata.
    pub async fn list_api_keys(&self) -> AppResult<Vec<ApiKey>> {
        self.repository.list_api_keys().await
    }

    /// Returns the metadata of the key the caller authenticated with.
    ///
    /// Human callers get `NotFound`.
    pub async fn caller_api_key(&self, caller: &Caller) -> AppResult<ApiKey> {
        let Caller::ApiKey(api_key_id) = caller else {
            return Err(AppError::NotFound(
                "caller is not an api key".to_owned(),
            ));
        };

        self.repository
            .find_api_key(*api_key_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("api key '{api_key_id}'")))
    }

    /// Authenticates a presented bearer value and returns the machine caller.
    pub async fn authenticate(&self, bearer_value: &str) -> AppResult<Caller> {
        let token = ApiKeyToken::parse(bearer_value)?;

        let credential = self
            .repository
            .find_api_key_credential(token.api_key_id())
            .await?;
        let encoded_hash = credential
            .as_ref()
            .map_or(self.generator.placeholder_hash(), |credential| {
                credential.encoded_hash.as_str()
            });

        let verified = self
            .generator
            .verify(token.secret().expose(), encoded_hash)
            .await?;

        match credential {
            Some(credential) if verified => Ok(Caller::ApiKey(credential.api_key_id)),
            _ => Err(invalid_api_key()),
        }
    }
}

fn invalid_api_key() -> AppError {
    AppError::Unauthorized("invalid api key".to_owned())
}

#[cfg(test)]
mod tests;
