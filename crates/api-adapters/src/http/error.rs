//! HTTP mapping for domain errors.
//!
//! Keeps `DomainError` HTTP-agnostic; this is the only place a variant
//! becomes a status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use domains::DomainError;

use super::response::ApiResponse;

/// Convenient result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

pub fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Client-facing text. Internal details never leave the process.
fn public_message(err: &DomainError) -> String {
    match err {
        DomainError::Validation(m)
        | DomainError::Unauthorized(m)
        | DomainError::Forbidden(m)
        | DomainError::Conflict(m) => m.clone(),
        DomainError::NotFound { entity, .. } => format!("{entity} not found"),
        DomainError::Internal(detail) => {
            error!(error = %detail, "request failed with internal error");
            "Internal server error".to_string()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let body = ApiResponse::failure(public_message(&self.0));
        (status, Json(body)).into_response()
    }
}
