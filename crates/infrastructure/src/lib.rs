//! Infrastructure adapters for Skyscraper.

#![forbid(unsafe_code)]

mod argon2_api_key_generator;
mod in_memory_store;
mod postgres_api_key_repository;
mod postgres_audit_log_repository;
mod postgres_cloud_account_repository;
mod postgres_organizational_unit_repository;
mod postgres_rows;
mod postgres_unit_of_work;
mod postgres_user_repository;

#[cfg(test)]
mod postgres_test_support;

pub use argon2_api_key_generator::{Argon2ApiKeyGenerator, Argon2WorkFactor};
pub use in_memory_store::{InMemoryStore, InMemoryUnitOfWork};
pub use postgres_api_key_repository::PostgresApiKeyRepository;
pub use postgres_audit_log_repository::PostgresAuditLogRepository;
pub use postgres_cloud_account_repository::PostgresCloudAccountRepository;
pub use postgres_organizational_unit_repository::PostgresOrganizationalUnitRepository;
pub use postgres_unit_of_work::{PostgresUnitOfWork, PostgresUnitOfWorkFactory};
pub use postgres_user_repository::PostgresUserRepository;
