//! Registry document errors

use super::EcopackError;

/// Creates an invalid registry document error
pub fn invalid(message: impl Into<String>) -> EcopackError {
    EcopackError::RegistryInvalid {
        message: message.into(),
    }
}
