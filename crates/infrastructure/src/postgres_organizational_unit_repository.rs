use async_trait::async_trait;
use sqlx::PgPool;

use skyscraper_application::OrganizationalUnitRepository;
use skyscraper_core::{AppError, AppResult};
use skyscraper_domain::{ApiKeyId, OrganizationalUnitId, UserId};

/// PostgreSQL-backed repository for organizational unit reachability.
///
/// Both queries expand assigned units with their descendants through a
/// recursive CTE. `UNION` deduplicates, so parent cycles terminate.
#[derive(Clone)]
pub struct PostgresOrganizationalUnitRepository {
    pool: PgPool,
}

impl PostgresOrganizationalUnitRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrganizationalUnitRepository for PostgresOrganizationalUnitRepository {
    async fn user_organizational_units(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<OrganizationalUnitId>> {
        let ids = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            WITH RECURSIVE assigned AS (
                SELECT organizational_unit_id
                FROM organizational_units_users
                WHERE user_id = $1
                UNION
                SELECT unit_groups.organizational_unit_id
                FROM organizational_units_groups unit_groups
                INNER JOIN user_groups
                    ON user_groups.group_name = unit_groups.group_name
                WHERE user_groups.user_id = $1
            ),
            reachable AS (
                SELECT organizational_unit_id AS id FROM assigned
                UNION
                SELECT child.id
                FROM organizational_units child
                INNER JOIN reachable ON child.parent_id = reachable.id
            )
            SELECT id FROM reachable ORDER BY id
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to resolve organizational units for user '{user_id}': {error}"
            ))
        })?;

        Ok(ids
            .into_iter()
            .map(OrganizationalUnitId::from_uuid)
            .collect())
    }

    async fn api_key_organizational_units(
        &self,
        api_key_id: ApiKeyId,
    ) -> AppResult<Vec<OrganizationalUnitId>> {
        let ids = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            WITH RECURSIVE reachable AS (
                SELECT organizational_unit_id AS id
                FROM organizational_units_api_keys
                WHERE api_key_id = $1
                UNION
                SELECT child.id
                FROM organizational_units child
                INNER JOIN reachable ON child.parent_id = reachable.id
            )
            SELECT id FROM reachable ORDER BY id
            "#,
        )
        .bind(api_key_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to resolve organizational units for api key '{api_key_id}': {error}"
            ))
        })?;

        Ok(ids
            .into_iter()
            .map(OrganizationalUnitId::from_uuid)
            .collect())
    }
}
