//! PostgreSQL-backed unit of work.
//!
//! Each unit owns one `READ COMMITTED` transaction. sqlx rolls a dropped
//! transaction back, so an unfinished unit never leaks its writes.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use skyscraper_application::{
    NewApiKey, NewAuditLogRecord, UnitOfWork, UnitOfWorkFactory, UnitOfWorkStatus,
};
use skyscraper_core::{AppError, AppResult};
use skyscraper_domain::{ApiKey, AuditLogRecord, CloudAccount, CloudAccountId, CloudAccountTags};

use crate::postgres_rows::{
    API_KEY_COLUMNS, AUDIT_LOG_COLUMNS, ApiKeyRow, AuditLogRow, CLOUD_ACCOUNT_COLUMNS,
    CloudAccountRow, is_unique_violation,
};

/// Opens PostgreSQL units of work from a connection pool.
#[derive(Clone)]
pub struct PostgresUnitOfWorkFactory {
    pool: PgPool,
}

impl PostgresUnitOfWorkFactory {
    /// Creates a factory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWorkFactory for PostgresUnitOfWorkFactory {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Transaction(format!("failed to begin transaction: {error}"))
        })?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL READ COMMITTED")
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Transaction(format!("failed to set isolation level: {error}"))
            })?;

        debug!("unit of work started");
        Ok(Box::new(PostgresUnitOfWork {
            transaction: Some(transaction),
            status: UnitOfWorkStatus::Open,
        }))
    }
}

/// One open PostgreSQL transaction.
pub struct PostgresUnitOfWork {
    transaction: Option<Transaction<'static, Postgres>>,
    status: UnitOfWorkStatus,
}

impl PostgresUnitOfWork {
    fn open_transaction(&mut self) -> AppResult<&mut Transaction<'static, Postgres>> {
        self.status.ensure_open()?;
        self.transaction.as_mut().ok_or_else(|| {
            AppError::Transaction("unit of work has no open transaction".to_owned())
        })
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    async fn insert_api_key(&mut self, input: NewApiKey) -> AppResult<ApiKey> {
        let transaction = self.open_transaction()?;

        let row = sqlx::query_as::<_, ApiKeyRow>(&format!(
            r#"
            INSERT INTO api_keys (owner, description, system, encoded_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {API_KEY_COLUMNS}
            "#
        ))
        .bind(input.owner.as_str())
        .bind(input.description.as_deref())
        .bind(input.system)
        .bind(input.encoded_hash.as_str())
        .fetch_one(&mut **transaction)
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                return AppError::Conflict("api key digest already exists".to_owned());
            }

            AppError::Internal(format!("failed to insert api key: {error}"))
        })?;

        row.into_api_key()
    }

    async fn update_cloud_account_tags(
        &mut self,
        cloud_account_id: CloudAccountId,
        tags_desired: CloudAccountTags,
    ) -> AppResult<CloudAccount> {
        let transaction = self.open_transaction()?;

        let row = sqlx::query_as::<_, CloudAccountRow>(&format!(
            r#"
            UPDATE cloud_accounts
            SET tags_desired = $2, updated_at = now()
            WHERE id = $1
            RETURNING {CLOUD_ACCOUNT_COLUMNS}
            "#
        ))
        .bind(cloud_account_id.as_uuid())
        .bind(Json(&tags_desired))
        .fetch_optional(&mut **transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to update cloud account tags: {error}"))
        })?
        .ok_or_else(|| AppError::NotFound(format!("cloud account '{cloud_account_id}'")))?;

        row.into_cloud_account()
    }

    async fn insert_audit_record(
        &mut self,
        record: NewAuditLogRecord,
    ) -> AppResult<AuditLogRecord> {
        let transaction = self.open_transaction()?;

        let row = sqlx::query_as::<_, AuditLogRow>(&format!(
            r#"
            INSERT INTO audit_logs (caller_type, caller_id, resource_type, resource_id, payload)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {AUDIT_LOG_COLUMNS}
            "#
        ))
        .bind(record.actor.kind().as_str())
        .bind(record.actor.id())
        .bind(record.resource_type.as_str())
        .bind(record.resource_id.as_str())
        .bind(&record.payload)
        .fetch_one(&mut **transaction)
        .await
        .map_err(|error| AppError::Audit(format!("failed to insert audit record: {error}")))?;

        row.into_record()
    }

    async fn commit(&mut self) -> AppResult<()> {
        self.open_transaction()?;
        let Some(transaction) = self.transaction.take() else {
            return Err(AppError::Transaction(
                "unit of work has no open transaction".to_owned(),
            ));
        };

        match transaction.commit().await {
            Ok(()) => {
                self.status = UnitOfWorkStatus::Committed;
                debug!("unit of work committed");
                Ok(())
            }
            Err(error) => {
                self.status = UnitOfWorkStatus::RolledBack;
                Err(AppError::Transaction(format!(
                    "failed to commit transaction: {error}"
                )))
            }
        }
    }

    async fn rollback(&mut self) -> AppResult<()> {
        if self.status != UnitOfWorkStatus::Open {
            return Ok(());
        }

        self.status = UnitOfWorkStatus::RolledBack;
        let Some(transaction) = self.transaction.take() else {
            return Ok(());
        };

        transaction.rollback().await.map_err(|error| {
            AppError::Transaction(format!("failed to roll back transaction: {error}"))
        })?;
        debug!("unit of work rolled back");
        Ok(())
    }
}
