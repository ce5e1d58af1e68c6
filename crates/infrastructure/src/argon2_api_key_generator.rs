//! Argon2id API key generator.
//!
//! Secrets are 32 bytes from the OS CSPRNG rendered as unpadded base64url.
//! Only the salted Argon2id PHC string is ever persisted.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use skyscraper_application::{ApiKeyGenerator, ApiKeySecret, GeneratedApiKey};
use skyscraper_core::{AppError, AppResult};

const SECRET_BYTES: usize = 32;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2WorkFactor {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for Argon2WorkFactor {
    fn default() -> Self {
        // OWASP Password Storage: Argon2id with m=19456, t=2, p=1.
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// API key generator backed by Argon2id digests.
///
/// Hashing and verification run on the blocking thread pool.
#[derive(Clone)]
pub struct Argon2ApiKeyGenerator {
    argon2: Argon2<'static>,
    placeholder_hash: String,
}

impl Argon2ApiKeyGenerator {
    /// Creates a generator with the given work factor.
    pub fn new(work_factor: Argon2WorkFactor) -> AppResult<Self> {
        let params = Params::new(
            work_factor.memory_kib,
            work_factor.iterations,
            work_factor.parallelism,
            None,
        )
        .map_err(|error| AppError::Validation(format!("invalid argon2 parameters: {error}")))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let placeholder_hash = generate_with(&argon2)?.encoded_hash;

        Ok(Self {
            argon2,
            placeholder_hash,
        })
    }
}

#[async_trait]
impl ApiKeyGenerator for Argon2ApiKeyGenerator {
    async fn generate(&self) -> AppResult<GeneratedApiKey> {
        let argon2 = self.argon2.clone();
        tokio::task::spawn_blocking(move || generate_with(&argon2))
            .await
            .map_err(|error| AppError::Internal(format!("api key hashing task failed: {error}")))?
    }

    async fn verify(&self, candidate: &str, encoded_hash: &str) -> AppResult<bool> {
        let argon2 = self.argon2.clone();
        let candidate = candidate.to_owned();
        let encoded_hash = encoded_hash.to_owned();

        tokio::task::spawn_blocking(move || verify_with(&argon2, &candidate, &encoded_hash))
            .await
            .map_err(|error| {
                AppError::Internal(format!("api key verification task failed: {error}"))
            })?
    }

    fn placeholder_hash(&self) -> &str {
        self.placeholder_hash.as_str()
    }
}

fn generate_with(argon2: &Argon2<'static>) -> AppResult<GeneratedApiKey> {
    let mut secret_bytes = [0_u8; SECRET_BYTES];
    OsRng
        .try_fill_bytes(&mut secret_bytes)
        .map_err(|error| AppError::Internal(format!("failed to read secret entropy: {error}")))?;
    let secret = URL_SAFE_NO_PAD.encode(secret_bytes);

    let salt = SaltString::generate(&mut OsRng);
    let encoded_hash = argon2
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|error| AppError::Internal(format!("failed to hash api key: {error}")))?
        .to_string();

    Ok(GeneratedApiKey {
        encoded_hash,
        secret: ApiKeySecret::new(secret),
    })
}

fn verify_with(argon2: &Argon2<'static>, candidate: &str, encoded_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(encoded_hash)
        .map_err(|error| AppError::Internal(format!("failed to parse api key digest: {error}")))?;

    match argon2.verify_password(candidate.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(error) => Err(AppError::Internal(format!(
            "api key verification failed: {error}"
        ))),
    }
}
