//! Orchestration manager and marketplace errors

use super::EcopackError;

/// Creates a manager REST API error
pub fn api(status: u16, message: impl Into<String>) -> EcopackError {
    EcopackError::ManagerApi {
        status,
        message: message.into(),
    }
}

/// Creates a marketplace webhook error
pub fn webhook_failed(status: u16, message: impl Into<String>) -> EcopackError {
    EcopackError::WebhookFailed {
        status,
        message: message.into(),
    }
}
