//! API key secrets, digests and the bearer token that carries them.

use std::fmt::{Debug, Formatter};

use async_trait::async_trait;
use skyscraper_core::{AppError, AppResult};
use skyscraper_domain::ApiKeyId;

/// Plaintext API key secret. Redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKeySecret(String);

impl ApiKeySecret {
    /// Wraps a plaintext secret.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the plaintext secret.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl Debug for ApiKeySecret {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("ApiKeySecret(<redacted>)")
    }
}

/// Output of one secret generation.
#[derive(Debug, Clone)]
pub struct GeneratedApiKey {
    /// Salted one-way digest to persist.
    pub encoded_hash: String,
    /// Plaintext secret to hand to the key owner exactly once.
    pub secret: ApiKeySecret,
}

/// Port for producing and verifying API key secrets.
#[async_trait]
pub trait ApiKeyGenerator: Send + Sync {
    /// Generates a high-entropy secret and its salted digest.
    async fn generate(&self) -> AppResult<GeneratedApiKey>;

    /// Checks a candidate secret against a stored digest.
    async fn verify(&self, candidate: &str, encoded_hash: &str) -> AppResult<bool>;

    /// Digest of a discarded secret, hashed with this generator's parameters.
    ///
    /// Presented tokens naming an unknown key are verified against it, so an
    /// unknown id costs as much as a wrong secret.
    fn placeholder_hash(&self) -> &str;
}

/// Bearer credential presented by machine callers: `<api_key_id>.<secret>`.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKeyToken {
    api_key_id: ApiKeyId,
    secret: ApiKeySecret,
}

impl ApiKeyToken {
    /// Pairs a key identifier with its plaintext secret.
    #[must_use]
    pub fn new(api_key_id: ApiKeyId, secret: ApiKeySecret) -> Self {
        Self { api_key_id, secret }
    }

    /// Parses a presented bearer value.
    pub fn parse(value: &str) -> AppResult<Self> {
        let malformed = || AppError::Unauthorized("malformed api key token".to_owned());

        let (raw_id, secret) = value.trim().split_once('.').ok_or_else(malformed)?;
        if secret.is_empty() {
            return Err(malformed());
        }
        let api_key_id = ApiKeyId::parse(raw_id).map_err(|_| malformed())?;

        Ok(Self::new(api_key_id, ApiKeySecret::new(secret)))
    }

    /// Returns the key identifier.
    #[must_use]
    pub fn api_key_id(&self) -> ApiKeyId {
        self.api_key_id
    }

    /// Returns the plaintext secret.
    #[must_use]
    pub fn secret(&self) -> &ApiKeySecret {
        &self.secret
    }

    /// Renders the value clients send after `Bearer `.
    #[must_use]
    pub fn to_bearer_value(&self) -> String {
        format!("{}.{}", self.api_key_id, self.secret.expose())
    }
}

impl Debug for ApiKeyToken {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ApiKeyToken")
            .field("api_key_id", &self.api_key_id)
            .field("secret", &self.secret)
            .finish()
    }
}
