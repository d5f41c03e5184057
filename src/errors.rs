use sea_orm::error::DbErr;

/// Error type shared by all domain services.
///
/// Persistence failures are wrapped unmodified; there is no retry logic in
/// this layer. Missing entities surface as `NotFound` only where the caller
/// asked for a specific record -- lookups that are expected to miss (carts,
/// dangling product references) return absent values instead.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Order error: {0}")]
    OrderError(String),

    #[error("Inventory error: {0}")]
    InventoryError(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_convert() {
        let errors = validator::ValidationErrors::new();
        let err: ServiceError = errors.into();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[test]
    fn db_errors_wrap_unmodified() {
        let err: ServiceError = DbErr::Custom("connection dropped".to_string()).into();
        assert!(matches!(err, ServiceError::DatabaseError(_)));
    }
}
