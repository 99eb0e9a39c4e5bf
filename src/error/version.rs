//! Version errors

use super::EcopackError;

/// Creates an invalid version error
pub fn invalid(version: impl Into<String>) -> EcopackError {
    EcopackError::InvalidVersion {
        version: version.into(),
    }
}
