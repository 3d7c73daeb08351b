//! Bearer tokens for every audience the process talks to.

use async_trait::async_trait;
use std::fmt;
use waba_core::{Audience, AuthError, StaticTokenSource, TokenSource};
use waba_mail::ClientCredentialsTokenSource;

use crate::config::AppConfig;

/// WhatsApp tokens are long-lived and come from configuration; the mail
/// token is obtained through the client-credentials grant.
pub struct AppTokenSource {
    whatsapp: StaticTokenSource,
    mail: Option<ClientCredentialsTokenSource>,
}

impl fmt::Debug for AppTokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppTokenSource")
            .field("whatsapp", &self.whatsapp)
            .field("mail", &self.mail.is_some())
            .finish()
    }
}

impl AppTokenSource {
    pub fn new(whatsapp: StaticTokenSource, mail: Option<ClientCredentialsTokenSource>) -> Self {
        Self { whatsapp, mail }
    }

    pub fn from_config(config: &AppConfig) -> waba_core::ApiResult<Self> {
        let whatsapp = StaticTokenSource::new()
            .with(Audience::WhatsAppProvider, config.provider_token.clone())
            .with(Audience::WhatsAppBusiness, config.business_token.clone());
        let mail = config
            .mail
            .as_ref()
            .map(ClientCredentialsTokenSource::new)
            .transpose()?;
        Ok(Self::new(whatsapp, mail))
    }
}

#[async_trait]
impl TokenSource for AppTokenSource {
    async fn bearer_token(&self, audience: Audience) -> Result<String, AuthError> {
        match audience {
            Audience::MailApi => match &self.mail {
                Some(mail) => mail.bearer_token(audience).await,
                None => Err(AuthError::MissingCredential(audience)),
            },
            Audience::WhatsAppProvider | Audience::WhatsAppBusiness => {
                self.whatsapp.bearer_token(audience).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_routes_by_audience() {
        let source = AppTokenSource::new(
            StaticTokenSource::new()
                .with(Audience::WhatsAppProvider, "provider")
                .with(Audience::WhatsAppBusiness, "business"),
            None,
        );
        assert_eq!(source.bearer_token(Audience::WhatsAppProvider).await.unwrap(), "provider");
        assert_eq!(source.bearer_token(Audience::WhatsAppBusiness).await.unwrap(), "business");
        assert_eq!(
            source.bearer_token(Audience::MailApi).await,
            Err(AuthError::MissingCredential(Audience::MailApi))
        );
    }

    #[test]
    fn test_debug_hides_tokens() {
        let source = AppTokenSource::new(
            StaticTokenSource::new().with(Audience::WhatsAppBusiness, "very-secret"),
            None,
        );
        assert!(!format!("{:?}", source).contains("very-secret"));
    }
}
