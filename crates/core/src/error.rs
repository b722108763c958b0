//! Domain error taxonomy shared by every layer.
//!
//! [`CoreError`] is what operations return; [`StoreError`] is what the store
//! ports return. Conflicts raised by a store keep their meaning, every other
//! store fault becomes [`CoreError::Internal`].

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid or unknown {field} reference: {value}")]
    InvalidReference { field: &'static str, value: String },

    #[error("Invalid quantity for {field}: {reason}")]
    InvalidQuantity { field: &'static str, reason: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Reference failure for an id that was never supplied.
    pub fn missing_reference(field: &'static str) -> Self {
        CoreError::InvalidReference {
            field,
            value: "none".to_string(),
        }
    }

    /// Reference failure for an id that does not resolve.
    pub fn unknown_reference(field: &'static str, id: DbId) -> Self {
        CoreError::InvalidReference {
            field,
            value: id.to_string(),
        }
    }
}

/// Failure reported by a store port.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("Duplicate value violates unique constraint: {constraint}")]
    Conflict { constraint: String },

    /// The backing store could not serve the request.
    #[error("Store unavailable: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { .. } => CoreError::Conflict(err.to_string()),
            StoreError::Backend(msg) => CoreError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_conflict_becomes_core_conflict() {
        let err: CoreError = StoreError::Conflict {
            constraint: "uq_figurine_definitions_name".into(),
        }
        .into();
        match err {
            CoreError::Conflict(msg) => assert!(msg.contains("uq_figurine_definitions_name")),
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn store_backend_becomes_internal() {
        let err: CoreError = StoreError::Backend("connection refused".into()).into();
        assert!(matches!(err, CoreError::Internal(ref m) if m == "connection refused"));
    }

    #[test]
    fn reference_helpers_render_value() {
        assert_eq!(
            CoreError::unknown_reference("faction", 7).to_string(),
            "Invalid or unknown faction reference: 7"
        );
        assert_eq!(
            CoreError::missing_reference("type").to_string(),
            "Invalid or unknown type reference: none"
        );
    }
}
