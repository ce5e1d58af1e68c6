use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use skyscraper_application::IssueApiKeyInput;
use skyscraper_domain::Caller;
use tracing::info;

use crate::dto::{ApiKeyResponse, IssueApiKeyRequest, IssuedApiKeyResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_api_keys_handler(
    State(state): State<AppState>,
    Extension(_caller): Extension<Caller>,
) -> ApiResult<Json<Vec<ApiKeyResponse>>> {
    let api_keys = state
        .api_key_service
        .list_api_keys()
        .await?
        .into_iter()
        .map(ApiKeyResponse::from)
        .collect();

    Ok(Json(api_keys))
}

pub async fn issue_api_key_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<IssueApiKeyRequest>,
) -> ApiResult<(StatusCode, Json<IssuedApiKeyResponse>)> {
    let issued = state
        .api_key_service
        .issue_api_key(
            &caller,
            IssueApiKeyInput {
                owner: payload.owner,
                description: payload.description,
            },
        )
        .await?;

    info!(%caller, api_key_id = %issued.api_key.id(), "api key issued");
    Ok((
        StatusCode::CREATED,
        Json(IssuedApiKeyResponse::from(issued)),
    ))
}

pub async fn current_api_key_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<ApiKeyResponse>> {
    let api_key = state.api_key_service.caller_api_key(&caller).await?;
    Ok(Json(ApiKeyResponse::from(api_key)))
}
