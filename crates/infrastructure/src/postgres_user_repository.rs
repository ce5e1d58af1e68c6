use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use skyscraper_application::UserRepository;
use skyscraper_core::{AppError, AppResult};
use skyscraper_domain::{User, UserId};

/// PostgreSQL-backed repository for user profiles.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: uuid::Uuid,
    username: String,
    name: Option<String>,
    email: Option<String>,
    groups: Vec<String>,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                users.id,
                users.username,
                users.name,
                users.email,
                COALESCE(
                    array_agg(user_groups.group_name ORDER BY user_groups.group_name)
                        FILTER (WHERE user_groups.group_name IS NOT NULL),
                    '{}'
                ) AS groups,
                users.created_at
            FROM users
            LEFT JOIN user_groups ON user_groups.user_id = users.id
            WHERE users.id = $1
            GROUP BY users.id
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user: {error}")))?;

        Ok(row.map(|row| User {
            id: UserId::from_uuid(row.id),
            username: row.username,
            name: row.name,
            email: row.email,
            groups: row.groups,
            created_at: row.created_at,
        }))
    }
}
