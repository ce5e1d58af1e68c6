//! Session bootstrap for human callers.
//!
//! Human identities come from an external identity provider. Until that
//! integration lands, a shared bootstrap token exchanges a known user id for
//! a session.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use skyscraper_core::AppError;
use skyscraper_domain::{Caller, UserId};
use subtle::ConstantTimeEq;
use tower_sessions::Session;
use tracing::info;

use crate::dto::BootstrapRequest;
use crate::error::ApiResult;
use crate::state::AppState;

pub const SESSION_CALLER_KEY: &str = "caller";
/// Absolute session creation timestamp.
pub const SESSION_CREATED_AT_KEY: &str = "session_created_at";

pub async fn bootstrap_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<BootstrapRequest>,
) -> ApiResult<StatusCode> {
    if !bootstrap_token_matches(payload.token.as_str(), state.bootstrap_token.as_str()) {
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()).into());
    }

    let user_id = UserId::parse(payload.user_id.as_str())?;
    let user = state
        .user_service
        .find_user(user_id)
        .await
        .map_err(|error| match error {
            AppError::NotFound(_) => AppError::Unauthorized(format!("unknown user '{user_id}'")),
            other => other,
        })?;

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_CALLER_KEY, Caller::User(user.id))
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist session caller: {error}")))?;

    session
        .insert(SESSION_CREATED_AT_KEY, chrono::Utc::now().timestamp())
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session creation time: {error}"))
        })?;

    info!(user_id = %user.id, username = %user.username, "session bootstrapped");
    Ok(StatusCode::NO_CONTENT)
}

fn bootstrap_token_matches(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}
