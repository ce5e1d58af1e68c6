use axum::Json;
use axum::extract::{Extension, Path, State};
use skyscraper_domain::{Caller, CloudAccountId};
use tracing::info;

use crate::dto::{CloudAccountResponse, UpdateCloudAccountTagsRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn get_cloud_account_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(cloud_account_id): Path<String>,
) -> ApiResult<Json<CloudAccountResponse>> {
    let cloud_account_id = CloudAccountId::parse(cloud_account_id.as_str())?;
    let cloud_account = state
        .cloud_account_service
        .find_visible_cloud_account(&caller, cloud_account_id)
        .await?;

    Ok(Json(CloudAccountResponse::from(cloud_account)))
}

pub async fn update_cloud_account_tags_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(cloud_account_id): Path<String>,
    Json(payload): Json<UpdateCloudAccountTagsRequest>,
) -> ApiResult<Json<CloudAccountResponse>> {
    let cloud_account_id = CloudAccountId::parse(cloud_account_id.as_str())?;
    let cloud_account = state
        .cloud_account_service
        .update_cloud_account_tags(&caller, cloud_account_id, payload.tags_desired)
        .await?;

    info!(%caller, %cloud_account_id, "cloud account tags updated");
    Ok(Json(CloudAccountResponse::from(cloud_account)))
}
