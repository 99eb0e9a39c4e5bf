//! Marketplace notification after a plugin release

use serde::Serialize;

use crate::error::{self, Result};
use crate::http;
use crate::runtime;

/// Body posted to the marketplace webhook
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseNotice<'a> {
    pub plugin_name: &'a str,
    pub version: &'a str,
    pub creator: &'a str,
}

/// Tell the marketplace to pick up a new plugin version
pub fn notify(webhook_url: &str, notice: &ReleaseNotice<'_>) -> Result<()> {
    tracing::info!(
        plugin = notice.plugin_name,
        version = notice.version,
        creator = notice.creator,
        "calling marketplace webhook"
    );
    let request = http::client()?.post(webhook_url).json(notice);

    runtime::block_on(async move {
        let response = request.send().await.map_err(http::transport_error)?;
        if response.status().is_success() {
            return Ok(());
        }
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        Err(error::manager::webhook_failed(status, text))
    })?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_payload_shape() {
        let notice = ReleaseNotice {
            plugin_name: "cloudify-aws-plugin",
            version: "2.5.0",
            creator: "octocat",
        };
        let payload = serde_json::to_value(&notice).unwrap();
        assert_eq!(
            payload,
            serde_json::json!({
                "plugin_name": "cloudify-aws-plugin",
                "version": "2.5.0",
                "creator": "octocat"
            })
        );
    }

    #[test]
    fn test_unreachable_webhook_is_transient() {
        let notice = ReleaseNotice {
            plugin_name: "p",
            version: "1.0.0",
            creator: "u",
        };
        // Port 9 (discard) on localhost is not listening in test environments
        let result = notify("http://127.0.0.1:9/webhook", &notice);
        assert!(matches!(
            result,
            Err(crate::error::EcopackError::TransientNetwork { .. })
        ));
    }
}
