//! Single-shot HTTP execution with outcome classification.
//!
//! A [`RemoteRequest`] names the method, URL, headers and body, plus the
//! exact set of statuses that count as success. [`RemoteApiClient`] sends
//! it once and returns either the decoded JSON body or an [`ApiError`].
//! There are no retries at this layer.

use crate::error::{ApiError, ApiResult};
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::time::Duration;

pub use reqwest::Method;

/// Statuses accepted by the WhatsApp Graph endpoints.
pub const WHATSAPP_ACCEPTED: &[u16] = &[200, 201];

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

/// One outbound call.
#[derive(Debug, Clone)]
pub struct RemoteRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub accepted: Vec<u16>,
    /// Success is decided by the status alone; the body is not decoded.
    pub status_only: bool,
}

impl RemoteRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: None,
            accepted: WHATSAPP_ACCEPTED.to_vec(),
            status_only: false,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Attach `Authorization: Bearer <token>`.
    ///
    /// A token that is not a valid header value is left off; the remote
    /// side then answers 401.
    pub fn bearer(mut self, token: &str) -> Self {
        if let Ok(v) = HeaderValue::from_str(&format!("Bearer {}", token)) {
            self.headers.insert(AUTHORIZATION, v);
        }
        self
    }

    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn form(mut self, fields: &[(&str, &str)]) -> Self {
        self.body = Some(RequestBody::Form(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ));
        self
    }

    /// Skip decoding the body of an accepted response.
    pub fn status_only(mut self) -> Self {
        self.status_only = true;
        self
    }

    /// Replace the set of statuses treated as success.
    pub fn accept(mut self, statuses: &[u16]) -> Self {
        self.accepted = statuses.to_vec();
        self
    }
}

/// Stateless executor shared by every higher component.
#[derive(Debug, Clone)]
pub struct RemoteApiClient {
    client: reqwest::Client,
}

impl RemoteApiClient {
    pub fn new(timeout: Duration) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| ApiError::transport(format!("HTTP client init failed: {}", e)))?;
        Ok(Self { client })
    }

    /// Send `request` once and classify the outcome.
    ///
    /// An accepted status with an empty body, or any accepted status on a
    /// `status_only` request, yields `{"success": true}`.
    pub async fn execute(&self, request: RemoteRequest) -> ApiResult<serde_json::Value> {
        debug!("{} {}", request.method, request.url);

        let mut req = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        req = match request.body {
            Some(RequestBody::Json(ref b)) => req.json(b),
            Some(RequestBody::Form(ref fields)) => req.form(fields),
            None => req,
        };

        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::transport(format!("Reading response body failed: {}", e)))?;

        if !request.accepted.contains(&status) {
            debug!("{} answered {}", request.url, status);
            return Err(ApiError::from_api_response(status, &body));
        }
        if request.status_only || body.trim().is_empty() {
            return Ok(serde_json::json!({ "success": true }));
        }
        serde_json::from_str(&body)
            .map_err(|e| ApiError::invalid_payload(format!("JSON parse error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorCode;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> RemoteApiClient {
        RemoteApiClient::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_ok_returns_decoded_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v23.0/42/phone_numbers"))
            .and(header("authorization", "Bearer tok"))
            .and(query_param("fields", "id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/v23.0/42/phone_numbers", server.uri());
        let value = client()
            .execute(RemoteRequest::get(url).bearer("tok").query("fields", "id"))
            .await
            .unwrap();
        assert_eq!(value, json!({"data": []}));
    }

    #[tokio::test]
    async fn test_created_is_success_and_empty_body_is_normalised() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/register"))
            .and(body_json(json!({"messaging_product": "whatsapp"})))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let value = client()
            .execute(
                RemoteRequest::post(format!("{}/register", server.uri()))
                    .json(json!({"messaging_product": "whatsapp"})),
            )
            .await
            .unwrap();
        assert_eq!(value, json!({"success": true}));
    }

    #[tokio::test]
    async fn test_accepted_status_set_is_exact() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let err = client()
            .execute(RemoteRequest::post(server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err.http_status, Some(202));
        assert_eq!(err.code, ApiErrorCode::RemoteApi);

        let ok = client()
            .execute(RemoteRequest::post(server.uri()).accept(&[202]))
            .await;
        assert!(ok.is_ok());
    }

    #[tokio::test]
    async fn test_rejection_keeps_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"message": "Missing permission", "code": 10}
            })))
            .mount(&server)
            .await;

        let err = client()
            .execute(RemoteRequest::get(server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ApiErrorCode::InsufficientPermissions);
        assert_eq!(err.message, "Missing permission");
        assert!(err.details.unwrap().contains("Missing permission"));
    }

    #[tokio::test]
    async fn test_form_body_is_urlencoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let value = client()
            .execute(
                RemoteRequest::post(server.uri())
                    .form(&[("grant_type", "client_credentials")])
                    .accept(&[200]),
            )
            .await
            .unwrap();
        assert_eq!(value["ok"], 1);
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_invalid_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client()
            .execute(RemoteRequest::get(server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ApiErrorCode::InvalidPayload);
    }

    #[tokio::test]
    async fn test_status_only_ignores_plain_text_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
            .mount(&server)
            .await;

        let value = client()
            .execute(RemoteRequest::post(server.uri()).status_only())
            .await
            .unwrap();
        assert_eq!(value, json!({"success": true}));
    }

    #[tokio::test]
    async fn test_transport_failure_is_typed() {
        // Nothing listens on port 1.
        let err = client()
            .execute(RemoteRequest::get("http://127.0.0.1:1/unreachable"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ApiErrorCode::Transport);
        assert!(err.http_status.is_none());
    }
}
