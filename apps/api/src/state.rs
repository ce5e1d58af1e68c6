use skyscraper_application::{
    ApiKeyService, AuditLogService, CallerResolver, CloudAccountService, UserService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub api_key_service: ApiKeyService,
    pub caller_resolver: CallerResolver,
    pub cloud_account_service: CloudAccountService,
    pub user_service: UserService,
    pub audit_log_service: AuditLogService,
    pub frontend_url: String,
    pub bootstrap_token: String,
}
