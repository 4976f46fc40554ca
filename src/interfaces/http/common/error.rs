//! Domain error to HTTP response mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::ApiResponse;
use crate::domain::DomainError;

/// Handler error: a domain failure rendered in the response envelope
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::InvalidRange(_)
            | DomainError::PastStart
            | DomainError::AlreadyCancelled(_)
            | DomainError::PastBooking(_)
            | DomainError::InvalidState { .. }
            | DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::Gateway(_) => StatusCode::BAD_GATEWAY,
            DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self.0, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %self.0, "Request rejected");
        }

        let body = ApiResponse::<()>::error(self.0.to_string());
        (status, Json(body)).into_response()
    }
}
