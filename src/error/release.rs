//! Hosting API and release errors

use super::EcopackError;

/// Creates a release not found error
pub fn not_found(tag: impl Into<String>) -> EcopackError {
    EcopackError::ReleaseNotFound { tag: tag.into() }
}

/// Creates a hosting API error from a non-success response
pub fn hosting_api(status: u16, message: impl Into<String>) -> EcopackError {
    EcopackError::HostingApi {
        status,
        message: message.into(),
    }
}

/// Creates a transient network error
pub fn transient(message: impl Into<String>) -> EcopackError {
    EcopackError::TransientNetwork {
        message: message.into(),
    }
}
