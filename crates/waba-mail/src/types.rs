//! Mail configuration and Graph `sendMail` payload types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mail API settings, injected at construction.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct MailConfig {
    /// Azure AD application (client) id.
    pub client_id: String,
    pub client_secret: String,
    /// Token authority, e.g. `https://login.microsoftonline.com/{tenant}`.
    pub authority: String,
    /// Mailbox the acknowledgement is sent from.
    pub sender: String,
    #[serde(default = "default_graph_base_url")]
    pub graph_base_url: String,
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(default = "default_timeout")]
    pub timeout_sec: u32,
}

impl MailConfig {
    /// Authority for a tenant on the public Microsoft cloud.
    pub fn tenant_authority(tenant_id: &str) -> String {
        format!("https://login.microsoftonline.com/{}", tenant_id)
    }
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"******")
            .field("authority", &self.authority)
            .field("sender", &self.sender)
            .field("graph_base_url", &self.graph_base_url)
            .field("scope", &self.scope)
            .field("timeout_sec", &self.timeout_sec)
            .finish()
    }
}

fn default_graph_base_url() -> String {
    "https://graph.microsoft.com".to_string()
}
fn default_scope() -> String {
    "https://graph.microsoft.com/.default".to_string()
}
fn default_timeout() -> u32 {
    30
}

/// Access token plus its expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Whether the access token has expired (with 60-second grace).
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at - chrono::Duration::seconds(60)
    }
}

// ─── sendMail payload ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendMailRequest {
    pub message: MailMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailMessage {
    pub subject: String,
    pub body: ItemBody,
    pub to_recipients: Vec<Recipient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    pub content_type: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub email_address: EmailAddress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub address: String,
}

impl SendMailRequest {
    /// Plain-text acknowledgement of a reported issue.
    pub fn acknowledgement(
        post_code: &str,
        issue_type: &str,
        acknowledgement: &str,
        customer_email: &str,
    ) -> Self {
        Self {
            message: MailMessage {
                subject: format!("{} reported at {}", issue_type, post_code),
                body: ItemBody {
                    content_type: "Text".to_string(),
                    content: acknowledgement.to_string(),
                },
                to_recipients: vec![Recipient {
                    email_address: EmailAddress {
                        address: customer_email.to_string(),
                    },
                }],
            },
        }
    }
}
