//! Shared HTTP plumbing for the hosting, manager and marketplace clients

use std::time::Duration;

use reqwest::{Client, Response};

use crate::error::{self, EcopackError, Result};

pub const USER_AGENT: &str = concat!("ecopack/", env!("CARGO_PKG_VERSION"));

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

pub fn client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| error::config::invalid(format!("Failed to build HTTP client: {e}")))
}

/// Map a transport failure; everything but an undecodable body is retryable
pub fn transport_error(err: reqwest::Error) -> EcopackError {
    if err.is_decode() {
        error::validate::parse_failed("HTTP response", err.to_string())
    } else {
        error::release::transient(err.to_string())
    }
}

/// Status and a readable message from a failed response
///
/// JSON bodies with a `message` field (GitHub, the manager) yield that field;
/// anything else yields the raw text.
pub async fn failure(response: Response) -> (u16, String) {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(ToOwned::to_owned))
        .unwrap_or(text);
    (status, message)
}
