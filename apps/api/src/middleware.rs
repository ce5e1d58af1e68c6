use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use skyscraper_core::AppError;
use skyscraper_domain::Caller;
use tower_sessions::{Session, session};

use crate::auth::SESSION_CALLER_KEY;
use crate::error::ApiResult;
use crate::state::AppState;

/// Resolves the request caller from an API key bearer token or the session.
///
/// The caller is attached as an `Extension<Caller>` for handlers.
pub async fn require_caller(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let bearer = bearer_token(request.headers())?.map(str::to_owned);
    let caller = match bearer {
        Some(token) => state.api_key_service.authenticate(token.as_str()).await?,
        None => session_caller(session.get::<Caller>(SESSION_CALLER_KEY).await)?,
    };

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

/// Rejects cross-origin state-changing requests that rely on the session cookie.
///
/// Bearer-authenticated requests carry no ambient credential and are exempt.
pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let headers = request.headers();
    if is_state_changing_method(request.method())
        && !headers.contains_key(header::AUTHORIZATION)
        && !is_same_origin(headers, state.frontend_url.as_str())
    {
        return Err(AppError::Forbidden("origin validation failed".to_owned()).into());
    }

    Ok(next.run(request).await)
}

fn session_caller(stored: Result<Option<Caller>, session::Error>) -> Result<Caller, AppError> {
    match stored {
        Ok(Some(caller)) => Ok(caller),
        Ok(None) => Err(AppError::Unauthorized("authentication required".to_owned())),
        Err(session::Error::SerdeJson(error)) => Err(AppError::UnrecognizedCaller(format!(
            "unreadable session caller: {error}"
        ))),
        Err(error) => Err(AppError::Internal(format!(
            "failed to read session caller: {error}"
        ))),
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AppError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(Some)
        .ok_or_else(|| AppError::Unauthorized("unsupported authorization scheme".to_owned()))
}

fn is_same_origin(headers: &HeaderMap, allowed_origin: &str) -> bool {
    if headers.get("sec-fetch-site") == Some(&HeaderValue::from_static("cross-site")) {
        return false;
    }

    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let referer = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    origin == allowed_origin || (!allowed_origin.is_empty() && referer.starts_with(allowed_origin))
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}
