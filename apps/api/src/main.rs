//! Skyscraper API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use skyscraper_core::AppError;
use skyscraper_infrastructure::Argon2ApiKeyGenerator;
use tracing::info;

use crate::api_config::ApiConfig;
use crate::api_services::{
    StoragePorts, build_app_state, build_postgres_session_layer, connect_and_migrate,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    api_config::init_tracing();

    let config = ApiConfig::load()?;
    let pool = connect_and_migrate(config.database_url.as_str()).await?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let session_layer = build_postgres_session_layer(pool.clone(), config.cookie_secure).await?;
    let api_key_generator = Argon2ApiKeyGenerator::new(config.api_key_work_factor)?;

    let app_state = build_app_state(
        StoragePorts::postgres(pool),
        Arc::new(api_key_generator),
        config.frontend_url.clone(),
        config.bootstrap_token.clone(),
    );
    let app = api_router::build_router(
        app_state,
        config.frontend_url.as_str(),
        session_layer,
        config.request_timeout,
    )?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "skyscraper-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
