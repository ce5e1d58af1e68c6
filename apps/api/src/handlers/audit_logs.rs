use axum::Json;
use axum::extract::{Extension, Query, State};
use skyscraper_application::AuditLogQuery;
use skyscraper_domain::{AuditResourceType, Caller};

use crate::dto::{AuditLogQueryParams, AuditLogRecordResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_audit_logs_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<AuditLogQueryParams>,
) -> ApiResult<Json<Vec<AuditLogRecordResponse>>> {
    let defaults = AuditLogQuery::default();
    let resource_type = query
        .resource_type
        .as_deref()
        .map(str::parse::<AuditResourceType>)
        .transpose()?;

    let records = state
        .audit_log_service
        .list_audit_log(
            &caller,
            AuditLogQuery {
                limit: query.limit.unwrap_or(defaults.limit),
                offset: query.offset.unwrap_or(defaults.offset),
                resource_type,
                resource_id: query.resource_id,
            },
        )
        .await?
        .into_iter()
        .map(AuditLogRecordResponse::from)
        .collect();

    Ok(Json(records))
}
