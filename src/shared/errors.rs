use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Vehicle not found: {0}")]
    VehicleNotFound(String),

    #[error("Vehicle {vehicle_id} is unavailable: {reason}")]
    VehicleUnavailable { vehicle_id: String, reason: String },

    #[error("{entity} cannot move from '{from}' to '{to}'")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("A trip already exists for booking {0}")]
    DuplicateTrip(String),

    #[error("Mileage at return ({end}) is lower than at pickup ({start})")]
    InvalidMileage { start: u32, end: u32 },

    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    /// Whether this error is likely transient (e.g. DB connection lost)
    /// and the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, DomainError::Storage(_))
    }

    /// Stable machine-readable classification used in API responses.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::InvalidRange(_) => "invalid_range",
            DomainError::VehicleNotFound(_) => "vehicle_not_found",
            DomainError::VehicleUnavailable { .. } => "vehicle_unavailable",
            DomainError::InvalidTransition { .. } => "invalid_transition",
            DomainError::DuplicateTrip(_) => "duplicate_trip",
            DomainError::InvalidMileage { .. } => "invalid_mileage",
            DomainError::NotFound { .. } => "not_found",
            DomainError::AccessDenied(_) => "access_denied",
            DomainError::Validation(_) => "validation_failed",
            DomainError::Conflict(_) => "conflict",
            DomainError::Storage(_) => "storage_unavailable",
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        DomainError::NotFound {
            entity,
            field: "id",
            value: id.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<InfraError> for DomainError {
    fn from(e: InfraError) -> Self {
        DomainError::Storage(e.to_string())
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_storage_errors_are_transient() {
        assert!(DomainError::Storage("connection reset".into()).is_transient());
        assert!(!DomainError::VehicleNotFound("veh_1".into()).is_transient());
        assert!(!DomainError::Validation("bad".into()).is_transient());
    }

    #[test]
    fn infra_errors_become_storage_errors() {
        let err: DomainError = InfraError::Database(sea_orm::DbErr::Custom("gone".into())).into();
        assert_eq!(err.code(), "storage_unavailable");
        assert!(err.to_string().contains("gone"));
    }
}
