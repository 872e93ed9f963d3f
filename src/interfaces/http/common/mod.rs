//! Common HTTP types: response envelope, error mapping, extractors

mod validated_json;

pub use validated_json::{ValidatedJson, ValidatedJsonRejection};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::shared::errors::DomainError;

/// Standard API response wrapper
///
/// Success: `{"success": true, "data": {...}}`.
/// Failure: `{"success": false, "data": null, "error": "...", "code": "..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Machine-readable error classification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            code: None,
        }
    }

    pub fn failure(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            code: Some(code.into()),
        }
    }
}

/// Empty response for operations without return data
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmptyData {}

/// Domain error rendered at the HTTP edge
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::InvalidRange(_) => StatusCode::BAD_REQUEST,
            DomainError::VehicleNotFound(_) | DomainError::NotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            DomainError::VehicleUnavailable { .. }
            | DomainError::InvalidTransition { .. }
            | DomainError::DuplicateTrip(_)
            | DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::InvalidMileage { .. } | DomainError::Validation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            DomainError::AccessDenied(_) => StatusCode::FORBIDDEN,
            DomainError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_transient() {
            error!(error = %self.0, "Storage failure while serving request");
        }
        let body = ApiResponse::<()>::failure(self.0.to_string(), self.0.code());
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Wrap a service result in the success envelope
pub fn respond<T, U: From<T>>(result: Result<T, DomainError>) -> ApiResult<U> {
    result
        .map(|value| Json(ApiResponse::success(U::from(value))))
        .map_err(ApiError)
}

/// Same as [`respond`] for lists
pub fn respond_list<T, U: From<T>>(result: Result<Vec<T>, DomainError>) -> ApiResult<Vec<U>> {
    result
        .map(|values| Json(ApiResponse::success(values.into_iter().map(U::from).collect())))
        .map_err(ApiError)
}
