//! API error types

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;
use vmview_inventory::InventoryError;

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code
    pub code: String,
    /// Error message
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Wrapper for API errors with status codes
pub struct AppError {
    pub status: StatusCode,
    pub error: ApiError,
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        let status = StatusCode::from_u16(err.status_code())
            .ok()
            .filter(|s| s.is_client_error() || s.is_server_error())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let error = match &err {
            InventoryError::UpstreamAuth { .. } => {
                ApiError::new("UPSTREAM_AUTH_FAILED", err.to_string())
            }
            InventoryError::UpstreamNotFound { body, .. } => ApiError::new("VM_NOT_FOUND", body),
            InventoryError::UpstreamAction { body, .. } => {
                ApiError::new("POWER_ACTION_FAILED", body)
            }
            InventoryError::InvalidAction(_) => ApiError::new("INVALID_ACTION", err.to_string()),
            InventoryError::Upstream(_) => ApiError::new("UPSTREAM_ERROR", err.to_string()),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %err, "request failed");
        }

        Self { status, error }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}
