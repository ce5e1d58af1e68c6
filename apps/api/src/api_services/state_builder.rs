use std::sync::Arc;

use skyscraper_application::{
    ApiKeyGenerator, ApiKeyRepository, ApiKeyService, AuditLogRepository, AuditLogService,
    AuditRecorder, CallerResolver, CloudAccountRepository, CloudAccountService,
    OrganizationalUnitRepository, UnitOfWorkFactory, UserRepository, UserService,
};
use skyscraper_infrastructure::{
    PostgresApiKeyRepository, PostgresAuditLogRepository, PostgresCloudAccountRepository,
    PostgresOrganizationalUnitRepository, PostgresUnitOfWorkFactory, PostgresUserRepository,
};
use sqlx::PgPool;

use crate::state::AppState;

/// Storage adapters behind every application port.
#[derive(Clone)]
pub struct StoragePorts {
    pub unit_of_work_factory: Arc<dyn UnitOfWorkFactory>,
    pub api_keys: Arc<dyn ApiKeyRepository>,
    pub organizational_units: Arc<dyn OrganizationalUnitRepository>,
    pub cloud_accounts: Arc<dyn CloudAccountRepository>,
    pub users: Arc<dyn UserRepository>,
    pub audit_log: Arc<dyn AuditLogRepository>,
}

impl StoragePorts {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            unit_of_work_factory: Arc::new(PostgresUnitOfWorkFactory::new(pool.clone())),
            api_keys: Arc::new(PostgresApiKeyRepository::new(pool.clone())),
            organizational_units: Arc::new(PostgresOrganizationalUnitRepository::new(
                pool.clone(),
            )),
            cloud_accounts: Arc::new(PostgresCloudAccountRepository::new(pool.clone())),
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            audit_log: Arc::new(PostgresAuditLogRepository::new(pool)),
        }
    }

    #[cfg(test)]
    pub fn in_memory(store: &skyscraper_infrastructure::InMemoryStore) -> Self {
        Self {
            unit_of_work_factory: Arc::new(store.clone()),
            api_keys: Arc::new(store.clone()),
            organizational_units: Arc::new(store.clone()),
            cloud_accounts: Arc::new(store.clone()),
            users: Arc::new(store.clone()),
            audit_log: Arc::new(store.clone()),
        }
    }
}

pub fn build_app_state(
    ports: StoragePorts,
    api_key_generator: Arc<dyn ApiKeyGenerator>,
    frontend_url: String,
    bootstrap_token: String,
) -> AppState {
    let audit_recorder = AuditRecorder::new();
    let caller_resolver = CallerResolver::new(ports.organizational_units);

    AppState {
        api_key_service: ApiKeyService::new(
            ports.unit_of_work_factory.clone(),
            ports.api_keys,
            api_key_generator,
            audit_recorder,
        ),
        cloud_account_service: CloudAccountService::new(
            caller_resolver.clone(),
            ports.cloud_accounts,
            ports.unit_of_work_factory,
            audit_recorder,
        ),
        audit_log_service: AuditLogService::new(caller_resolver.clone(), ports.audit_log),
        caller_resolver,
        user_service: UserService::new(ports.users),
        frontend_url,
        bootstrap_token,
    }
}
