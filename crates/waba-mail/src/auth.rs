//! OAuth2 client-credentials token source for the mail API.
//!
//! Daemon-style grant against `{authority}/oauth2/v2.0/token`. The token
//! is cached until shortly before it expires.

use crate::types::{CachedToken, MailConfig};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, error, info};
use std::fmt;
use std::time::Duration;
use tokio::sync::Mutex;
use waba_core::{ApiErrorCode, ApiResult, Audience, AuthError, RemoteApiClient, RemoteRequest, TokenSource};

/// The token endpoint reports grant failures as JSON on 400/401.
const TOKEN_STATUSES: &[u16] = &[200, 400, 401];

pub struct ClientCredentialsTokenSource {
    http: RemoteApiClient,
    config: MailConfig,
    cache: Mutex<Option<CachedToken>>,
}

impl fmt::Debug for ClientCredentialsTokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentialsTokenSource")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ClientCredentialsTokenSource {
    pub fn new(config: &MailConfig) -> ApiResult<Self> {
        Ok(Self {
            http: RemoteApiClient::new(Duration::from_secs(config.timeout_sec as u64))?,
            config: config.clone(),
            cache: Mutex::new(None),
        })
    }

    pub fn token_url(&self) -> String {
        format!(
            "{}/oauth2/v2.0/token",
            self.config.authority.trim_end_matches('/')
        )
    }

    async fn request_token(&self) -> Result<CachedToken, AuthError> {
        let request = RemoteRequest::post(self.token_url())
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("grant_type", "client_credentials"),
                ("scope", self.config.scope.as_str()),
            ])
            .accept(TOKEN_STATUSES);

        let body = self.http.execute(request).await.map_err(|e| match e.code {
            ApiErrorCode::Transport => AuthError::Transport(e.message),
            ApiErrorCode::InvalidPayload => AuthError::InvalidResponse(e.message),
            _ => AuthError::Rejected {
                code: e
                    .http_status
                    .map(|s| format!("http_{}", s))
                    .unwrap_or_else(|| "unknown".to_string()),
                description: e.message,
            },
        })?;
        parse_token_response(&body)
    }
}

#[async_trait]
impl TokenSource for ClientCredentialsTokenSource {
    async fn bearer_token(&self, audience: Audience) -> Result<String, AuthError> {
        if audience != Audience::MailApi {
            return Err(AuthError::MissingCredential(audience));
        }

        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.as_ref().filter(|t| !t.is_expired()) {
            debug!("Reusing cached mail API token");
            return Ok(token.access_token.clone());
        }

        match self.request_token().await {
            Ok(token) => {
                info!("Obtained mail API token, expires at {}", token.expires_at);
                let access = token.access_token.clone();
                *cache = Some(token);
                Ok(access)
            }
            Err(e) => {
                error!("Failed to obtain access token: {}", e);
                Err(e)
            }
        }
    }
}

fn parse_token_response(v: &serde_json::Value) -> Result<CachedToken, AuthError> {
    if let Some(code) = v["error"].as_str() {
        return Err(AuthError::Rejected {
            code: code.to_string(),
            description: v["error_description"]
                .as_str()
                .unwrap_or("Unknown error")
                .to_string(),
        });
    }

    let access_token = v["access_token"]
        .as_str()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::InvalidResponse("no access_token in response".to_string()))?
        .to_string();
    let expires_in = v["expires_in"].as_i64().unwrap_or(3600);

    Ok(CachedToken {
        access_token,
        expires_at: Utc::now() + chrono::Duration::seconds(expires_in),
    })
}
