use serde::Serialize;

/// API error payload.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    status: &'static str,
    message: String,
}

impl ErrorResponse {
    pub(super) fn new(status: &'static str, message: String) -> Self {
        Self { status, message }
    }
}
