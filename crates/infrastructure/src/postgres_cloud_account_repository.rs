use async_trait::async_trait;
use sqlx::PgPool;

use skyscraper_application::CloudAccountRepository;
use skyscraper_core::{AppError, AppResult};
use skyscraper_domain::{CloudAccount, CloudAccountId, OrganizationalUnitId};

use crate::postgres_rows::{CLOUD_ACCOUNT_COLUMNS, CloudAccountRow};

/// PostgreSQL-backed repository for cloud account reads.
#[derive(Clone)]
pub struct PostgresCloudAccountRepository {
    pool: PgPool,
}

impl PostgresCloudAccountRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CloudAccountRepository for PostgresCloudAccountRepository {
    async fn cloud_accounts_by_organizational_units(
        &self,
        organizational_unit_ids: &[OrganizationalUnitId],
    ) -> AppResult<Vec<CloudAccount>> {
        if organizational_unit_ids.is_empty() {
            return Ok(Vec::new());
        }

        let unit_ids: Vec<uuid::Uuid> = organizational_unit_ids
            .iter()
            .map(OrganizationalUnitId::as_uuid)
            .collect();

        let rows = sqlx::query_as::<_, CloudAccountRow>(&format!(
            r#"
            SELECT {CLOUD_ACCOUNT_COLUMNS}
            FROM cloud_accounts
            WHERE organizational_unit_id = ANY($1)
            ORDER BY created_at, id
            "#
        ))
        .bind(unit_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list cloud accounts: {error}")))?;

        rows.into_iter()
            .map(CloudAccountRow::into_cloud_account)
            .collect()
    }

    async fn find_cloud_account(
        &self,
        cloud_account_id: CloudAccountId,
    ) -> AppResult<Option<CloudAccount>> {
        sqlx::query_as::<_, CloudAccountRow>(&format!(
            "SELECT {CLOUD_ACCOUNT_COLUMNS} FROM cloud_accounts WHERE id = $1"
        ))
        .bind(cloud_account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find cloud account: {error}")))?
        .map(CloudAccountRow::into_cloud_account)
        .transpose()
    }
}
