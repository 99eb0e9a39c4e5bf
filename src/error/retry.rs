//! Bounded retry errors, shared by release uploads and registry writes

use super::EcopackError;

/// Creates a retries exhausted error
pub fn exhausted(
    operation: impl Into<String>,
    attempts: u32,
    last_error: impl Into<String>,
) -> EcopackError {
    EcopackError::RetriesExhausted {
        operation: operation.into(),
        attempts,
        last_error: last_error.into(),
    }
}
