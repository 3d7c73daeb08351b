//! Phone-number registration for Cloud API messaging.
//!
//! Registration is scoped to the owning client business, so it uses the
//! business token rather than the provider token. Re-registering an
//! already registered number is left to the remote service.

use crate::api_client::GraphClient;
use log::{error, info};
use serde_json::json;
use waba_core::{ApiError, ApiResult, Audience};

const REJECTED: &str = "Failed to register phone number";
const FAILED: &str = "Phone registration failed";

#[derive(Debug, Clone)]
pub struct PhoneRegistrar {
    client: GraphClient,
    pin: String,
}

impl PhoneRegistrar {
    pub fn new(client: GraphClient, pin: impl Into<String>) -> Self {
        Self {
            client,
            pin: pin.into(),
        }
    }

    /// `POST /{phone_number_id}/register`.
    pub async fn register(&self, phone_number_id: &str) -> ApiResult<()> {
        info!("Registering phone number {}", phone_number_id);
        match self.send(phone_number_id).await {
            Ok(()) => {
                info!("Successfully registered phone number {}", phone_number_id);
                Ok(())
            }
            Err(e) => {
                let e = e.in_step(REJECTED, FAILED);
                error!("Phone number {}: {}", phone_number_id, e);
                Err(e)
            }
        }
    }

    async fn send(&self, phone_number_id: &str) -> ApiResult<()> {
        validate_pin(&self.pin)?;

        let url = self.client.node_url(phone_number_id, "register")?;
        let body = json!({
            "messaging_product": "whatsapp",
            "pin": self.pin,
        });
        self.client
            .post_status(Audience::WhatsAppBusiness, &url, body)
            .await
    }
}

/// Two-step verification PINs are exactly six digits.
pub fn validate_pin(pin: &str) -> ApiResult<()> {
    if pin.len() != 6 || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::invalid_parameter(
            "registration PIN must be exactly 6 digits",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GraphConfig;
    use std::sync::Arc;
    use waba_core::{ApiErrorCode, StaticTokenSource};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn registrar(server: &MockServer, pin: &str) -> PhoneRegistrar {
        let config = GraphConfig {
            base_url: server.uri(),
            ..GraphConfig::default()
        };
        let tokens = StaticTokenSource::new()
            .with(Audience::WhatsAppProvider, "provider")
            .with(Audience::WhatsAppBusiness, "business");
        PhoneRegistrar::new(GraphClient::new(&config, Arc::new(tokens)).unwrap(), pin)
    }

    #[test]
    fn test_pin_validation() {
        assert!(validate_pin("141414").is_ok());
        assert!(validate_pin("12345").is_err());
        assert!(validate_pin("12345a").is_err());
        assert!(validate_pin("1234567").is_err());
    }

    #[tokio::test]
    async fn test_register_sends_fixed_payload_with_business_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v23.0/813532365168347/register"))
            .and(header("authorization", "Bearer business"))
            .and(body_json(json!({"messaging_product": "whatsapp", "pin": "141414"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        registrar(&server, "141414")
            .register("813532365168347")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_register_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"message": "Invalid parameter", "code": 100}
            })))
            .mount(&server)
            .await;

        let err = registrar(&server, "141414").register("1").await.unwrap_err();
        assert_eq!(err.message, "Failed to register phone number");
        assert_eq!(err.http_status, Some(400));
    }

    #[tokio::test]
    async fn test_plain_text_success_body_counts_as_registered() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v23.0/1/register"))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
            .expect(1)
            .mount(&server)
            .await;

        registrar(&server, "141414").register("1").await.unwrap();
    }

    #[tokio::test]
    async fn test_path_breaking_id_never_reaches_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = registrar(&server, "141414")
            .register("1/subscribed_apps?x=")
            .await
            .unwrap_err();
        assert_eq!(err.code, ApiErrorCode::InvalidParameter);
        assert!(err.message.starts_with("Phone registration failed: "));
    }

    #[tokio::test]
    async fn test_bad_pin_never_reaches_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = registrar(&server, "12").register("1").await.unwrap_err();
        assert_eq!(err.code, ApiErrorCode::InvalidParameter);
        assert!(err.message.starts_with("Phone registration failed: "));
    }
}
