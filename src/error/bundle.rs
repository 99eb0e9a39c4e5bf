//! Bundle errors

use super::EcopackError;

/// Creates a bundle planning error
pub fn invalid(message: impl Into<String>) -> EcopackError {
    EcopackError::BundleInvalid {
        message: message.into(),
    }
}

/// Creates an archive write error
pub fn archive_failed(path: impl Into<String>, reason: impl Into<String>) -> EcopackError {
    EcopackError::ArchiveFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
