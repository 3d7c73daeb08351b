//! Phone-number listing for a WABA.
//!
//! The Graph API answers `/{waba_id}/phone_numbers` either wrapped as
//! `{ "data": [...] }` or as a bare array; [`normalize_phone_numbers`]
//! turns both into one `Vec<PhoneNumber>`.

use crate::api_client::GraphClient;
use crate::types::PhoneNumber;
use async_trait::async_trait;
use log::{error, info, warn};
use waba_core::{ApiError, ApiResult, Audience};

const REJECTED: &str = "Failed to list phone numbers";
const FAILED: &str = "Phone numbers listing failed";

const FIELDS: &str = "id,display_phone_number,verified_name,status,quality_rating,\
                      code_verification_status,platform_type";

/// Anything that can list the phone numbers of one WABA.
#[async_trait]
pub trait PhoneNumberSource: Send + Sync {
    async fn list_phone_numbers(&self, waba_id: &str) -> ApiResult<Vec<PhoneNumber>>;
}

/// Catalog backed by `/{waba_id}/phone_numbers`, read with the provider token.
#[derive(Debug, Clone)]
pub struct PhoneNumberCatalog {
    client: GraphClient,
}

impl PhoneNumberCatalog {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    async fn fetch(&self, waba_id: &str) -> ApiResult<Vec<PhoneNumber>> {
        let url = self.client.node_url(waba_id, "phone_numbers")?;
        let payload = self
            .client
            .get(Audience::WhatsAppProvider, &url, &[("fields", FIELDS)])
            .await?;
        normalize_phone_numbers(payload)
    }
}

#[async_trait]
impl PhoneNumberSource for PhoneNumberCatalog {
    async fn list_phone_numbers(&self, waba_id: &str) -> ApiResult<Vec<PhoneNumber>> {
        match self.fetch(waba_id).await {
            Ok(numbers) => {
                info!("Successfully listed {} phone numbers for WABA {}", numbers.len(), waba_id);
                Ok(numbers)
            }
            Err(e) => {
                let e = e.in_step(REJECTED, FAILED);
                error!("WABA {}: {}", waba_id, e);
                Err(e)
            }
        }
    }
}

/// Accept `{ "data": [...] }` or `[...]`. Every record is kept, in order.
pub fn normalize_phone_numbers(payload: serde_json::Value) -> ApiResult<Vec<PhoneNumber>> {
    let records = match payload {
        serde_json::Value::Array(arr) => arr,
        serde_json::Value::Object(mut obj) => match obj.remove("data") {
            Some(serde_json::Value::Array(arr)) => arr,
            Some(serde_json::Value::Null) | None => Vec::new(),
            Some(_) => {
                return Err(ApiError::invalid_payload(
                    "phone number listing `data` is not an array",
                ))
            }
        },
        _ => {
            return Err(ApiError::invalid_payload(
                "phone number listing is neither an object nor an array",
            ))
        }
    };

    let numbers: Vec<PhoneNumber> = records.iter().map(PhoneNumber::from_value).collect();
    let anonymous = numbers.iter().filter(|n| !n.has_id()).count();
    if anonymous > 0 {
        warn!("{} phone number records carry no id", anonymous);
    }
    Ok(numbers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GraphConfig, RegistrationStatus};
    use serde_json::json;
    use std::sync::Arc;
    use waba_core::{ApiErrorCode, StaticTokenSource};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn catalog(server: &MockServer) -> PhoneNumberCatalog {
        let config = GraphConfig {
            base_url: server.uri(),
            ..GraphConfig::default()
        };
        let tokens = StaticTokenSource::new()
            .with(Audience::WhatsAppProvider, "provider")
            .with(Audience::WhatsAppBusiness, "business");
        PhoneNumberCatalog::new(GraphClient::new(&config, Arc::new(tokens)).unwrap())
    }

    #[test]
    fn test_normalize_wrapped_and_bare() {
        let wrapped = normalize_phone_numbers(json!({"data": [{"id": "1"}, {"id": "2"}]})).unwrap();
        assert_eq!(wrapped.len(), 2);

        let bare = normalize_phone_numbers(json!([{"id": "1"}])).unwrap();
        assert_eq!(bare[0].phone_number_id, "1");

        let empty = normalize_phone_numbers(json!({"paging": {}})).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_normalize_keeps_records_without_id() {
        let numbers =
            normalize_phone_numbers(json!({"data": [{"id": "1"}, {"verified_name": "x"}, 7]}))
                .unwrap();
        assert_eq!(numbers.len(), 3);
        assert_eq!(numbers[0].phone_number_id, "1");
        assert!(!numbers[1].has_id());
        assert_eq!(numbers[1].verified_name, "x");
        assert_eq!(numbers[2].raw, json!(7));
    }

    #[test]
    fn test_normalize_rejects_other_shapes() {
        let err = normalize_phone_numbers(json!("nope")).unwrap_err();
        assert_eq!(err.code, ApiErrorCode::InvalidPayload);
        assert!(normalize_phone_numbers(json!({"data": {"id": "1"}})).is_err());
    }

    #[tokio::test]
    async fn test_list_uses_provider_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v23.0/waba-1/phone_numbers"))
            .and(header("authorization", "Bearer provider"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{
                    "id": "796698196867835",
                    "display_phone_number": "+44 20 7946 0000",
                    "verified_name": "Best Movers",
                    "status": "CONNECTED"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let numbers = catalog(&server).list_phone_numbers("waba-1").await.unwrap();
        assert_eq!(numbers.len(), 1);
        assert_eq!(numbers[0].verified_name, "Best Movers");
        assert_eq!(numbers[0].registration_status, RegistrationStatus::Registered);
    }

    #[tokio::test]
    async fn test_forbidden_yields_step_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"message": "(#200) Permissions error", "code": 200}
            })))
            .mount(&server)
            .await;

        let err = catalog(&server).list_phone_numbers("waba-1").await.unwrap_err();
        assert_eq!(err.message, "Failed to list phone numbers");
        assert_eq!(err.http_status, Some(403));
    }

    #[tokio::test]
    async fn test_empty_waba_id_is_rejected_locally() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = catalog(&server).list_phone_numbers("  ").await.unwrap_err();
        assert_eq!(err.code, ApiErrorCode::InvalidParameter);
    }
}
