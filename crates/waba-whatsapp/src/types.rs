//! Configuration, domain records and report shapes for WABA provisioning.

use serde::{Deserialize, Serialize};

// ─── Configuration ───────────────────────────────────────────────────

/// The tech-provider's managed business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    /// Client business id used to filter the assigned-WABA listing.
    pub account_id: String,
    /// Business portfolio under which client WABAs are discovered.
    pub business_portfolio_id: String,
}

/// Meta Graph API endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Base URL override (default: `https://graph.facebook.com`).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Graph API version (e.g. "v23.0").
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Timeout in seconds for API calls.
    #[serde(default = "default_timeout")]
    pub timeout_sec: u32,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_version: default_api_version(),
            timeout_sec: default_timeout(),
        }
    }
}

/// Everything the orchestrator needs, injected at construction.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisioningConfig {
    pub business: Business,
    #[serde(default)]
    pub graph: GraphConfig,
    /// Two-step verification PIN sent with every registration.
    pub registration_pin: String,
    /// Concurrent phone-number lookups during aggregation (1 = sequential).
    #[serde(default = "default_fan_out")]
    pub fan_out: usize,
    /// Upper bound on directory pages followed.
    #[serde(default = "default_max_directory_pages")]
    pub max_directory_pages: u32,
}

impl std::fmt::Debug for ProvisioningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisioningConfig")
            .field("business", &self.business)
            .field("graph", &self.graph)
            .field("registration_pin", &"******")
            .field("fan_out", &self.fan_out)
            .field("max_directory_pages", &self.max_directory_pages)
            .finish()
    }
}

fn default_base_url() -> String {
    "https://graph.facebook.com".to_string()
}
fn default_api_version() -> String {
    "v23.0".to_string()
}
fn default_timeout() -> u32 {
    30
}
fn default_fan_out() -> usize {
    4
}
fn default_max_directory_pages() -> u32 {
    20
}

// ─── Directory / catalog records ─────────────────────────────────────

/// One entry of the assigned-WABA listing.
///
/// `id` is absent when the remote entry carried none; such entries are
/// kept here and skipped by the aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WabaRef {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl WabaRef {
    pub fn from_value(v: &serde_json::Value) -> Self {
        let id = match &v["id"] {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        };
        Self {
            id,
            name: v["name"].as_str().map(String::from),
        }
    }
}

/// Messaging registration state of a phone number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Unregistered,
    Registered,
    Error,
}

impl RegistrationStatus {
    /// Map the Graph `status` field of a phone number.
    pub fn from_graph_status(status: Option<&str>) -> Self {
        match status {
            Some("CONNECTED") => Self::Registered,
            Some("BANNED") | Some("FLAGGED") | Some("RESTRICTED") | Some("RATE_LIMITED") => {
                Self::Error
            }
            _ => Self::Unregistered,
        }
    }

    /// Only an unregistered number moves, to registered or error.
    pub fn after_registration(self, succeeded: bool) -> Self {
        match (self, succeeded) {
            (Self::Unregistered, true) => Self::Registered,
            (Self::Unregistered, false) => Self::Error,
            (other, _) => other,
        }
    }
}

/// A phone number owned by a WABA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneNumber {
    pub phone_number_id: String,
    pub display_number: String,
    pub verified_name: String,
    pub registration_status: RegistrationStatus,
    pub quality_rating: Option<String>,
    /// The record exactly as the Graph API returned it.
    pub raw: serde_json::Value,
}

impl PhoneNumber {
    /// Every record maps; one without an `id` keeps an empty
    /// `phone_number_id` and its `raw` form.
    pub fn from_value(v: &serde_json::Value) -> Self {
        let id = match &v["id"] {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => String::new(),
        };
        Self {
            phone_number_id: id,
            display_number: v["display_phone_number"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
            verified_name: v["verified_name"].as_str().unwrap_or_default().to_string(),
            registration_status: RegistrationStatus::from_graph_status(v["status"].as_str()),
            quality_rating: v["quality_rating"].as_str().map(String::from),
            raw: v.clone(),
        }
    }

    pub fn has_id(&self) -> bool {
        !self.phone_number_id.is_empty()
    }
}

// ─── Results ─────────────────────────────────────────────────────────

/// One WABA in a [`ProvisioningReport`].
///
/// Built only through [`WabaEntry::listed`] or [`WabaEntry::failed`], so
/// an entry with an `error` never carries phone numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WabaEntry {
    pub waba_id: String,
    pub phone_numbers: Vec<PhoneNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WabaEntry {
    pub fn listed(waba_id: impl Into<String>, phone_numbers: Vec<PhoneNumber>) -> Self {
        Self {
            waba_id: waba_id.into(),
            phone_numbers,
            error: None,
        }
    }

    pub fn failed(waba_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            waba_id: waba_id.into(),
            phone_numbers: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Aggregated WABA / phone-number view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProvisioningReport {
    Success { count: usize, items: Vec<WabaEntry> },
    Error { message: String },
}

impl ProvisioningReport {
    pub fn success(items: Vec<WabaEntry>) -> Self {
        Self::Success {
            count: items.len(),
            items,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn items(&self) -> &[WabaEntry] {
        match self {
            Self::Success { items, .. } => items,
            Self::Error { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Error,
}

/// `{status, message}` result of a single-shot operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationOutcome {
    pub status: OutcomeStatus,
    pub message: String,
    /// Set by phone registration once the request reached the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_status: Option<RegistrationStatus>,
}

impl OperationOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Success,
            message: message.into(),
            registration_status: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Error,
            message: message.into(),
            registration_status: None,
        }
    }

    pub fn with_registration(mut self, status: RegistrationStatus) -> Self {
        self.registration_status = Some(status);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_defaults() {
        let cfg: ProvisioningConfig = serde_json::from_value(json!({
            "business": {"account_id": "111", "business_portfolio_id": "222"},
            "registration_pin": "141414"
        }))
        .unwrap();
        assert_eq!(cfg.graph.api_version, "v23.0");
        assert_eq!(cfg.graph.base_url, "https://graph.facebook.com");
        assert_eq!(cfg.fan_out, 4);
        assert_eq!(cfg.max_directory_pages, 20);
        assert!(!format!("{:?}", cfg).contains("141414"));
    }

    #[test]
    fn test_waba_ref_from_value() {
        assert_eq!(WabaRef::from_value(&json!({"id": "A"})).id.as_deref(), Some("A"));
        assert_eq!(WabaRef::from_value(&json!({"id": 77})).id.as_deref(), Some("77"));
        assert!(WabaRef::from_value(&json!({})).id.is_none());
        assert!(WabaRef::from_value(&json!({"id": ""})).id.is_none());
        assert!(WabaRef::from_value(&json!("A")).id.is_none());
    }

    #[test]
    fn test_phone_number_from_value() {
        let record = json!({
            "id": "813532365168347",
            "display_phone_number": "+44 7700 900123",
            "verified_name": "Best Movers",
            "status": "CONNECTED",
            "quality_rating": "GREEN"
        });
        let pn = PhoneNumber::from_value(&record);
        assert_eq!(pn.phone_number_id, "813532365168347");
        assert_eq!(pn.display_number, "+44 7700 900123");
        assert_eq!(pn.registration_status, RegistrationStatus::Registered);
        assert_eq!(pn.quality_rating.as_deref(), Some("GREEN"));
        assert_eq!(pn.raw, record);

        let minimal = PhoneNumber::from_value(&json!({"id": 9}));
        assert_eq!(minimal.phone_number_id, "9");
        assert_eq!(minimal.registration_status, RegistrationStatus::Unregistered);

        let anonymous = PhoneNumber::from_value(&json!({"display_phone_number": "+1"}));
        assert!(!anonymous.has_id());
        assert_eq!(anonymous.display_number, "+1");
        assert_eq!(anonymous.raw, json!({"display_phone_number": "+1"}));
    }

    #[test]
    fn test_registration_transitions() {
        use RegistrationStatus::*;
        assert_eq!(Unregistered.after_registration(true), Registered);
        assert_eq!(Unregistered.after_registration(false), Error);
        assert_eq!(Registered.after_registration(false), Registered);
        assert_eq!(Error.after_registration(true), Error);
        assert_eq!(RegistrationStatus::from_graph_status(Some("FLAGGED")), Error);
        assert_eq!(RegistrationStatus::from_graph_status(Some("PENDING")), Unregistered);
    }

    #[test]
    fn test_report_serialization() {
        let report = ProvisioningReport::success(vec![
            WabaEntry::listed("A", vec![]),
            WabaEntry::failed("B", "Failed to list phone numbers"),
        ]);
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["status"], "success");
        assert_eq!(v["count"], 2);
        assert!(v["items"][0].get("error").is_none());
        assert_eq!(v["items"][1]["error"], "Failed to list phone numbers");
        assert_eq!(v["items"][1]["phone_numbers"], json!([]));

        let err = serde_json::to_value(ProvisioningReport::error("boom")).unwrap();
        assert_eq!(err, json!({"status": "error", "message": "boom"}));
    }

    #[test]
    fn test_outcome_serialization() {
        let v = serde_json::to_value(OperationOutcome::success("Phone number registered")).unwrap();
        assert_eq!(v, json!({"status": "success", "message": "Phone number registered"}));
    }
}
