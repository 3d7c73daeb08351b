//! Process configuration loaded from the environment.
//!
//! Variables use three prefixes: `WABA_BUSINESS_` for the client business,
//! `WABA_PROVIDER_` for the tech provider, `ER_EMAIL_` for the mail API.
//! A `.env` file is honoured when present.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use waba_mail::MailConfig;
use waba_whatsapp::{Business, GraphConfig, ProvisioningConfig};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub provisioning: ProvisioningConfig,
    pub provider_token: String,
    pub business_token: String,
    /// Absent when no `ER_EMAIL_*` variables are set.
    pub mail: Option<MailConfig>,
    pub log_json: bool,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("provisioning", &self.provisioning)
            .field("provider_token", &"******")
            .field("business_token", &"******")
            .field("mail", &self.mail)
            .field("log_json", &self.log_json)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);
        let defaults = GraphConfig::default();

        let registration_pin = vars.required("WABA_BUSINESS_REGISTRATION_PIN")?;
        if waba_whatsapp::registration::validate_pin(&registration_pin).is_err() {
            return Err(ConfigError::Invalid {
                name: "WABA_BUSINESS_REGISTRATION_PIN",
                reason: "must be exactly 6 digits".to_string(),
            });
        }

        let fan_out: usize = vars.parsed("WABA_PROVIDER_FAN_OUT", 4)?;
        if fan_out == 0 {
            return Err(ConfigError::Invalid {
                name: "WABA_PROVIDER_FAN_OUT",
                reason: "must be at least 1".to_string(),
            });
        }

        let provisioning = ProvisioningConfig {
            business: Business {
                account_id: vars.required("WABA_BUSINESS_ACCOUNT_ID")?,
                business_portfolio_id: vars.required("WABA_PROVIDER_BUSINESS_PORTFOLIO_ID")?,
            },
            graph: GraphConfig {
                base_url: vars.optional("WABA_PROVIDER_BASE_URL").unwrap_or(defaults.base_url),
                api_version: vars
                    .optional("WABA_PROVIDER_GRAPH_API_VERSION")
                    .unwrap_or(defaults.api_version),
                timeout_sec: vars.parsed("WABA_PROVIDER_TIMEOUT_SEC", defaults.timeout_sec)?,
            },
            registration_pin,
            fan_out,
            max_directory_pages: vars.parsed("WABA_PROVIDER_MAX_DIRECTORY_PAGES", 20)?,
        };

        Ok(Self {
            provisioning,
            provider_token: vars.required("WABA_PROVIDER_TOKEN")?,
            business_token: vars.required("WABA_BUSINESS_TOKEN")?,
            mail: mail_config(&vars)?,
            log_json: vars
                .optional("WABA_LOG_FORMAT")
                .is_some_and(|f| f.eq_ignore_ascii_case("json")),
        })
    }
}

fn mail_config<F>(vars: &Vars<'_, F>) -> Result<Option<MailConfig>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    const MAIL_VARS: &[&str] = &[
        "ER_EMAIL_CLIENT_ID",
        "ER_EMAIL_CLIENT_SECRET_VALUE",
        "ER_EMAIL_TENANT_ID",
        "ER_EMAIL_AUTHORITY",
        "ER_EMAIL_SENDER",
    ];
    if MAIL_VARS.iter().all(|name| vars.optional(name).is_none()) {
        return Ok(None);
    }

    let authority = match vars.optional("ER_EMAIL_AUTHORITY") {
        Some(authority) => authority,
        None => MailConfig::tenant_authority(&vars.required("ER_EMAIL_TENANT_ID")?),
    };

    Ok(Some(MailConfig {
        client_id: vars.required("ER_EMAIL_CLIENT_ID")?,
        client_secret: vars.required("ER_EMAIL_CLIENT_SECRET_VALUE")?,
        authority,
        sender: vars.required("ER_EMAIL_SENDER")?,
        graph_base_url: vars
            .optional("ER_EMAIL_GRAPH_BASE_URL")
            .unwrap_or_else(|| "https://graph.microsoft.com".to_string()),
        scope: "https://graph.microsoft.com/.default".to_string(),
        timeout_sec: vars.parsed("ER_EMAIL_TIMEOUT_SEC", 30)?,
    }))
}

struct Vars<'a, F>(&'a F);

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn parsed<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.optional(name) {
            Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
                name,
                reason: e.to_string(),
            }),
            None => Ok(default),
        }
    }
}
