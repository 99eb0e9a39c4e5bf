//! Object storage errors

use super::EcopackError;

/// Creates an object not found error
pub fn not_found(key: impl Into<String>) -> EcopackError {
    EcopackError::ObjectNotFound { key: key.into() }
}

/// Creates a storage operation failed error
pub fn failed(
    operation: impl Into<String>,
    key: impl Into<String>,
    reason: impl Into<String>,
) -> EcopackError {
    EcopackError::StorageFailed {
        operation: operation.into(),
        key: key.into(),
        reason: reason.into(),
    }
}

/// Creates a precondition failed error for a conditional write
pub fn precondition_failed(key: impl Into<String>) -> EcopackError {
    EcopackError::PreconditionFailed { key: key.into() }
}
