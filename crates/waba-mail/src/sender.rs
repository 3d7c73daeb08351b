//! Best-effort acknowledgement email through Graph `sendMail`.

use crate::types::{MailConfig, SendMailRequest};
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;
use waba_core::{ApiError, ApiResult, Audience, RemoteApiClient, RemoteRequest, TokenSource};

/// Graph queues the message and answers 202 Accepted.
const SEND_ACCEPTED: &[u16] = &[202];

pub const SENT: &str = "Email sent successfully.";

#[derive(Clone)]
pub struct NotificationSender {
    http: RemoteApiClient,
    config: MailConfig,
    tokens: Arc<dyn TokenSource>,
}

impl NotificationSender {
    pub fn new(config: &MailConfig, tokens: Arc<dyn TokenSource>) -> ApiResult<Self> {
        Ok(Self {
            http: RemoteApiClient::new(Duration::from_secs(config.timeout_sec as u64))?,
            config: config.clone(),
            tokens,
        })
    }

    pub fn send_mail_url(&self) -> String {
        format!(
            "{}/v1.0/users/{}/sendMail",
            self.config.graph_base_url.trim_end_matches('/'),
            self.config.sender
        )
    }

    /// Send the acknowledgement and describe the result as text.
    ///
    /// Never fails: a rejected send reads `"Error: <status>"`, any other
    /// failure `"Error: <message>"`.
    pub async fn send_email(
        &self,
        post_code: &str,
        issue_type: &str,
        acknowledgement: &str,
        customer_email: &str,
    ) -> String {
        let request =
            SendMailRequest::acknowledgement(post_code, issue_type, acknowledgement, customer_email);
        match self.deliver(&request).await {
            Ok(()) => {
                info!("Acknowledgement email sent to {}", customer_email);
                SENT.to_string()
            }
            Err(e) => {
                error!("Acknowledgement email to {} failed: {}", customer_email, e);
                match e.http_status {
                    Some(status) => format!("Error: {}", status),
                    None => format!("Error: {}", e.message),
                }
            }
        }
    }

    async fn deliver(&self, request: &SendMailRequest) -> ApiResult<()> {
        let body = serde_json::to_value(request)
            .map_err(|e| ApiError::invalid_payload(e.to_string()))?;
        let token = self.tokens.bearer_token(Audience::MailApi).await?;
        self.http
            .execute(
                RemoteRequest::post(self.send_mail_url())
                    .bearer(&token)
                    .json(body)
                    .accept(SEND_ACCEPTED),
            )
            .await?;
        Ok(())
    }
}
