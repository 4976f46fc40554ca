use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Invalid time range: {0}")]
    InvalidRange(String),

    #[error("start_time cannot be in the past")]
    PastStart,

    #[error("Vehicle is not available for the selected time range: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Booking {0} is already cancelled")]
    AlreadyCancelled(i32),

    #[error("Booking {0} has already ended and cannot be cancelled")]
    PastBooking(i32),

    #[error("Invalid state: {entity} is {actual}, expected {expected}")]
    InvalidState {
        entity: &'static str,
        actual: String,
        expected: &'static str,
    },

    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            field: "id",
            value: id.to_string(),
        }
    }

    /// Whether this error is likely transient (e.g. DB connection lost)
    /// and the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, DomainError::Storage(_) | DomainError::Gateway(_))
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<InfraError> for DomainError {
    fn from(e: InfraError) -> Self {
        match e {
            InfraError::Database(e) => DomainError::Storage(e.to_string()),
            InfraError::Serialization(e) => DomainError::Validation(e.to_string()),
            InfraError::Http(e) => DomainError::Gateway(e.to_string()),
        }
    }
}
