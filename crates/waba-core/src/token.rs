//! Bearer-token sources.
//!
//! Callers ask for a token per request and never hold on to it; a source
//! may cache internally.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Which API a bearer token is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    /// Tech-provider token: directory and phone-number reads.
    WhatsAppProvider,
    /// Client business token: registration, callback override, profile.
    WhatsAppBusiness,
    /// Microsoft Graph mail API.
    MailApi,
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WhatsAppProvider => "whatsapp provider",
            Self::WhatsAppBusiness => "whatsapp business",
            Self::MailApi => "mail api",
        };
        f.write_str(name)
    }
}

/// Token acquisition failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    #[error("no credential configured for the {0} audience")]
    MissingCredential(Audience),
    #[error("{code}: {description}")]
    Rejected { code: String, description: String },
    #[error("token endpoint unreachable: {0}")]
    Transport(String),
    #[error("malformed token response: {0}")]
    InvalidResponse(String),
}

/// Supplies a bearer token for a given audience.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn bearer_token(&self, audience: Audience) -> Result<String, AuthError>;
}

/// Tokens read once from stored configuration.
#[derive(Clone, Default)]
pub struct StaticTokenSource {
    tokens: HashMap<Audience, String>,
}

impl StaticTokenSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, audience: Audience, token: impl Into<String>) -> Self {
        self.tokens.insert(audience, token.into());
        self
    }

    pub fn serves(&self, audience: Audience) -> bool {
        self.tokens.get(&audience).is_some_and(|t| !t.is_empty())
    }
}

impl fmt::Debug for StaticTokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut audiences: Vec<String> = self.tokens.keys().map(|a| a.to_string()).collect();
        audiences.sort();
        f.debug_struct("StaticTokenSource")
            .field("audiences", &audiences)
            .finish()
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn bearer_token(&self, audience: Audience) -> Result<String, AuthError> {
        match self.tokens.get(&audience) {
            Some(token) if !token.is_empty() => Ok(token.clone()),
            _ => Err(AuthError::MissingCredential(audience)),
        }
    }
}
