//! Process-level wiring of the provisioning and notification services.

use std::sync::Arc;
use waba_core::{ApiResult, TokenSource};
use waba_mail::NotificationSender;
use waba_whatsapp::{BusinessProfileManager, GraphClient, ProvisioningOrchestrator};

use crate::config::AppConfig;
use crate::credentials::AppTokenSource;

/// Everything an upstream controller needs, built once from [`AppConfig`].
pub struct App {
    orchestrator: ProvisioningOrchestrator,
    profiles: BusinessProfileManager,
    notifications: Option<NotificationSender>,
}

impl App {
    pub fn from_config(config: &AppConfig) -> ApiResult<Self> {
        let tokens: Arc<dyn TokenSource> = Arc::new(AppTokenSource::from_config(config)?);
        Self::with_tokens(config, tokens)
    }

    /// Build against a caller-supplied token source.
    pub fn with_tokens(config: &AppConfig, tokens: Arc<dyn TokenSource>) -> ApiResult<Self> {
        let orchestrator = ProvisioningOrchestrator::new(&config.provisioning, tokens.clone())?;
        let profiles =
            BusinessProfileManager::new(GraphClient::new(&config.provisioning.graph, tokens.clone())?);
        let notifications = match &config.mail {
            Some(mail) => Some(NotificationSender::new(mail, tokens)?),
            None => {
                log::info!("Mail settings absent; acknowledgement emails disabled");
                None
            }
        };

        log::info!(
            "Provisioning for business {} via portfolio {} (Graph {})",
            config.provisioning.business.account_id,
            config.provisioning.business.business_portfolio_id,
            config.provisioning.graph.api_version
        );

        Ok(Self {
            orchestrator,
            profiles,
            notifications,
        })
    }

    pub fn orchestrator(&self) -> &ProvisioningOrchestrator {
        &self.orchestrator
    }

    pub fn profiles(&self) -> &BusinessProfileManager {
        &self.profiles
    }

    pub fn notifications(&self) -> Option<&NotificationSender> {
        self.notifications.as_ref()
    }
}
