use axum::Json;
use axum::extract::{Extension, State};
use skyscraper_domain::Caller;

use crate::dto::{CloudAccountResponse, ReachableOrganizationalUnitsResponse, UserProfileResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn profile_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<UserProfileResponse>> {
    let user = state.user_service.caller_profile(&caller).await?;
    Ok(Json(UserProfileResponse::from(user)))
}

pub async fn profile_cloud_accounts_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<Vec<CloudAccountResponse>>> {
    let cloud_accounts = state
        .cloud_account_service
        .visible_cloud_accounts(&caller)
        .await?
        .into_iter()
        .map(CloudAccountResponse::from)
        .collect();

    Ok(Json(cloud_accounts))
}

pub async fn profile_organizational_units_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<ReachableOrganizationalUnitsResponse>> {
    let reachable = state
        .caller_resolver
        .reachable_organizational_units(&caller)
        .await?;

    Ok(Json(reachable.into_iter().collect()))
}
