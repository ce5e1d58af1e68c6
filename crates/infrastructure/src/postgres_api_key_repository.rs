use async_trait::async_trait;
use sqlx::PgPool;

use skyscraper_application::{ApiKeyRepository, StoredApiKeyCredential};
use skyscraper_core::{AppError, AppResult};
use skyscraper_domain::{ApiKey, ApiKeyId};

use crate::postgres_rows::{API_KEY_COLUMNS, ApiKeyRow};

/// PostgreSQL-backed repository for API key reads.
#[derive(Clone)]
pub struct PostgresApiKeyRepository {
    pool: PgPool,
}

impl PostgresApiKeyRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiKeyRepository for PostgresApiKeyRepository {
    async fn list_api_keys(&self) -> AppResult<Vec<ApiKey>> {
        let rows = sqlx::query_as::<_, ApiKeyRow>(&format!(
            "SELECT {API_KEY_COLUMNS} FROM api_keys ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list api keys: {error}")))?;

        rows.into_iter().map(ApiKeyRow::into_api_key).collect()
    }

    async fn find_api_key(&self, api_key_id: ApiKeyId) -> AppResult<Option<ApiKey>> {
        sqlx::query_as::<_, ApiKeyRow>(&format!(
            "SELECT {API_KEY_COLUMNS} FROM api_keys WHERE id = $1"
        ))
        .bind(api_key_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find api key: {error}")))?
        .map(ApiKeyRow::into_api_key)
        .transpose()
    }

    async fn find_api_key_credential(
        &self,
        api_key_id: ApiKeyId,
    ) -> AppResult<Option<StoredApiKeyCredential>> {
        let encoded_hash =
            sqlx::query_scalar::<_, String>("SELECT encoded_hash FROM api_keys WHERE id = $1")
                .bind(api_key_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to load api key credential: {error}"))
                })?;

        Ok(encoded_hash.map(|encoded_hash| StoredApiKeyCredential {
            api_key_id,
            encoded_hash,
        }))
    }
}
