use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use skyscraper_core::AppError;
use tracing::{error, warn};

mod types;

pub use types::ErrorResponse;

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl ApiError {
    fn classify(&self) -> (StatusCode, &'static str, String) {
        match &self.0 {
            AppError::Validation(detail) => {
                (StatusCode::BAD_REQUEST, "validation_error", detail.clone())
            }
            AppError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                "not_found",
                "resource not found".to_owned(),
            ),
            AppError::Conflict(_) => (
                StatusCode::CONFLICT,
                "conflict",
                "resource conflict".to_owned(),
            ),
            AppError::Unauthorized(_) => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "authentication required".to_owned(),
            ),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden", "forbidden".to_owned()),
            AppError::UnrecognizedCaller(_)
            | AppError::Transaction(_)
            | AppError::Audit(_)
            | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error".to_owned(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, classification, message) = self.classify();

        match &self.0 {
            AppError::UnrecognizedCaller(detail) => {
                error!(integrity = true, detail = %detail, "unrecognized caller reached the api");
            }
            internal if internal.is_internal() => {
                error!(error = %internal, "request failed");
            }
            AppError::Unauthorized(detail) | AppError::Forbidden(detail) => {
                warn!(detail = %detail, "request rejected");
            }
            _ => {}
        }

        (status, Json(ErrorResponse::new(classification, message))).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
