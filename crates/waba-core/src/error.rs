//! Crate-level error types for remote API calls.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::token::AuthError;

/// Alias for `Result<T, ApiError>`.
pub type ApiResult<T> = Result<T, ApiError>;

/// Longest slice of a remote body kept for diagnostics.
const MAX_DETAIL_CHARS: usize = 500;

/// Uniform error type returned by every remote-call boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    /// Raw remote body or transport detail, for operators.
    pub details: Option<String>,
    /// HTTP status code if the remote service answered.
    pub http_status: Option<u16>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(status) = self.http_status {
            write!(f, " (HTTP {})", status)?;
        }
        if let Some(ref d) = self.details {
            write!(f, ": {}", d)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Categorised error codes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    // ── Auth ─────────────────────────────────────────────
    AuthFailed,
    InvalidAccessToken,
    TokenExpired,
    InsufficientPermissions,
    // ── Remote ───────────────────────────────────────────
    ResourceNotFound,
    RateLimited,
    RemoteApi,
    // ── Local ────────────────────────────────────────────
    Transport,
    InvalidParameter,
    InvalidPayload,
}

impl ApiError {
    pub fn new(code: ApiErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            details: None,
            http_status: None,
        }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Transport, msg)
    }

    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::InvalidParameter, msg)
    }

    pub fn invalid_payload(msg: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::InvalidPayload, msg)
    }

    /// True when the remote service answered with a non-accepted status.
    pub fn is_remote(&self) -> bool {
        self.http_status.is_some()
    }

    /// Build from a non-accepted response.
    ///
    /// Both Meta and Microsoft Graph wrap failures as
    /// `{ "error": { "message": "...", "code": ... } }`.
    pub fn from_api_response(status: u16, body: &str) -> Self {
        let message = Self::parse_error_message(body);
        Self {
            code: Self::classify(status, &message),
            message,
            details: Some(body.chars().take(MAX_DETAIL_CHARS).collect()),
            http_status: Some(status),
        }
    }

    /// Rename this failure after the step that produced it.
    ///
    /// A remote rejection gets the fixed `rejected` text and keeps the
    /// upstream message in `details`; anything else becomes
    /// `"<failed>: <cause>"`.
    pub fn in_step(mut self, rejected: &str, failed: &str) -> Self {
        if self.is_remote() {
            let upstream = std::mem::replace(&mut self.message, rejected.to_string());
            self.details = Some(match self.details.take() {
                Some(body) => format!("{}; {}", upstream, body),
                None => upstream,
            });
        } else {
            self.message = format!("{}: {}", failed, self.message);
        }
        self
    }

    fn parse_error_message(body: &str) -> String {
        match serde_json::from_str::<serde_json::Value>(body) {
            Ok(v) => v["error"]["message"]
                .as_str()
                .or_else(|| v["error_description"].as_str())
                .unwrap_or("Unknown API error")
                .to_string(),
            Err(_) => "Unparseable API error".to_string(),
        }
    }

    fn classify(status: u16, msg: &str) -> ApiErrorCode {
        let lower = msg.to_lowercase();
        match status {
            401 => {
                if lower.contains("expired") {
                    ApiErrorCode::TokenExpired
                } else {
                    ApiErrorCode::InvalidAccessToken
                }
            }
            403 => ApiErrorCode::InsufficientPermissions,
            404 => ApiErrorCode::ResourceNotFound,
            429 => ApiErrorCode::RateLimited,
            _ if lower.contains("rate limit") => ApiErrorCode::RateLimited,
            _ => ApiErrorCode::RemoteApi,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        Self::new(
            ApiErrorCode::AuthFailed,
            format!("Failed to obtain access token: {}", e),
        )
    }
}
