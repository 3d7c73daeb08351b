//! WABA webhook subscription settings.
//!
//! Repoints the callback URL and verify token Meta uses for one WABA via
//! `POST /{waba_id}/subscribed_apps`. Nothing is stored locally.

use crate::api_client::GraphClient;
use log::{error, info};
use serde_json::json;
use waba_core::{ApiError, ApiResult, Audience};

const REJECTED: &str = "Failed to override callback URL";
const FAILED: &str = "Callback URL override failed";

#[derive(Debug, Clone)]
pub struct WabaSubscriptions {
    client: GraphClient,
}

impl WabaSubscriptions {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    pub async fn override_callback_url(
        &self,
        waba_id: &str,
        callback_url: &str,
        verify_token: &str,
    ) -> ApiResult<()> {
        info!("Overriding callback URL for WABA {}", waba_id);
        match self.send(waba_id, callback_url, verify_token).await {
            Ok(()) => {
                info!("Callback URL for WABA {} now {}", waba_id, callback_url);
                Ok(())
            }
            Err(e) => {
                let e = e.in_step(REJECTED, FAILED);
                error!("WABA {}: {}", waba_id, e);
                Err(e)
            }
        }
    }

    async fn send(&self, waba_id: &str, callback_url: &str, verify_token: &str) -> ApiResult<()> {
        validate_callback_url(callback_url)?;
        if verify_token.is_empty() {
            return Err(ApiError::invalid_parameter("verify token must not be empty"));
        }

        let url = self.client.node_url(waba_id, "subscribed_apps")?;
        let body = json!({
            "override_callback_uri": callback_url,
            "verify_token": verify_token,
        });
        self.client
            .post_status(Audience::WhatsAppBusiness, &url, body)
            .await
    }
}

/// Meta only delivers webhooks to absolute `https` URLs.
pub fn validate_callback_url(callback_url: &str) -> ApiResult<()> {
    let parsed = url::Url::parse(callback_url)
        .map_err(|e| ApiError::invalid_parameter(format!("invalid callback URL: {}", e)))?;
    if parsed.scheme() != "https" || parsed.host_str().is_none() {
        return Err(ApiError::invalid_parameter(
            "callback URL must be an absolute https URL",
        ));
    }
    Ok(())
}
