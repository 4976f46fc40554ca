//! Shared HTTP building blocks: response envelope, error mapping, extractors

pub mod error;
pub mod validated_json;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use error::ApiError;
pub use validated_json::ValidatedJson;

/// Standard API response envelope
///
/// Success: `{"success": true, "data": {...}}`,
/// failure: `{"success": false, "data": null, "error": "..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    /// Payload, `null` on failure
    pub data: Option<T>,
    /// Failure description, omitted on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}
