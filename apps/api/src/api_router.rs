use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use skyscraper_core::AppError;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;

use crate::state::AppState;
use crate::{auth, handlers, middleware};

mod cors;

pub fn build_router(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<PostgresStore>,
    request_timeout: Duration,
) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route("/api/v1/profile", get(handlers::profile::profile_handler))
        .route(
            "/api/v1/profile/cloud-accounts",
            get(handlers::profile::profile_cloud_accounts_handler),
        )
        .route(
            "/api/v1/profile/organizational-units",
            get(handlers::profile::profile_organizational_units_handler),
        )
        .route(
            "/api/v1/api-keys",
            get(handlers::api_keys::list_api_keys_handler)
                .post(handlers::api_keys::issue_api_key_handler),
        )
        .route(
            "/api/v1/api-keys/current",
            get(handlers::api_keys::current_api_key_handler),
        )
        .route(
            "/api/v1/cloud-accounts/{cloud_account_id}",
            get(handlers::cloud_accounts::get_cloud_account_handler),
        )
        .route(
            "/api/v1/cloud-accounts/{cloud_account_id}/tags",
            put(handlers::cloud_accounts::update_cloud_account_tags_handler),
        )
        .route(
            "/api/v1/audit-logs",
            get(handlers::audit_logs::list_audit_logs_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_caller,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/bootstrap", post(auth::bootstrap_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(cors::build_cors_layer(frontend_url)?)
        .layer(session_layer)
        .with_state(app_state))
}
