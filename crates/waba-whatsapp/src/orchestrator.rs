//! Provisioning workflow over the assigned WABAs.
//!
//! [`ProvisioningOrchestrator`] is the single entry point an upstream
//! controller calls. It aggregates the directory and the phone-number
//! catalog into one [`ProvisioningReport`], registers phone numbers, and
//! overrides WABA callback URLs. Every operation returns a well-formed
//! value; only a failed directory lookup turns a report into an error.

use crate::api_client::GraphClient;
use crate::directory::{WabaDirectory, WabaSource};
use crate::phone_numbers::{PhoneNumberCatalog, PhoneNumberSource};
use crate::registration::PhoneRegistrar;
use crate::subscriptions::WabaSubscriptions;
use crate::types::{
    OperationOutcome, ProvisioningConfig, ProvisioningReport, RegistrationStatus, WabaEntry,
    WabaRef,
};
use futures::{FutureExt, StreamExt};
use log::{error, info, warn};
use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use waba_core::{ApiResult, TokenSource};

/// Entry point for WABA provisioning over the directory, the phone-number
/// catalog, registration and webhook subscriptions.
pub struct ProvisioningOrchestrator {
    directory: Arc<dyn WabaSource>,
    catalog: Arc<dyn PhoneNumberSource>,
    registrar: PhoneRegistrar,
    subscriptions: WabaSubscriptions,
    fan_out: usize,
}

impl ProvisioningOrchestrator {
    /// Wire every component against the Graph API.
    pub fn new(config: &ProvisioningConfig, tokens: Arc<dyn TokenSource>) -> ApiResult<Self> {
        let client = GraphClient::new(&config.graph, tokens)?;
        Ok(Self {
            directory: Arc::new(WabaDirectory::new(
                client.clone(),
                config.business.clone(),
                config.max_directory_pages,
            )),
            catalog: Arc::new(PhoneNumberCatalog::new(client.clone())),
            registrar: PhoneRegistrar::new(client.clone(), config.registration_pin.clone()),
            subscriptions: WabaSubscriptions::new(client),
            fan_out: config.fan_out.max(1),
        })
    }

    /// Swap the directory and catalog, e.g. for a cached or fake source.
    pub fn with_sources(
        mut self,
        directory: Arc<dyn WabaSource>,
        catalog: Arc<dyn PhoneNumberSource>,
    ) -> Self {
        self.directory = directory;
        self.catalog = catalog;
        self
    }

    /// Cap on concurrent phone-number lookups; at least 1.
    pub fn with_fan_out(mut self, fan_out: usize) -> Self {
        self.fan_out = fan_out.max(1);
        self
    }

    /// The directory listing as the service returned it.
    pub async fn list_assigned_wabas(&self) -> ApiResult<Vec<WabaRef>> {
        self.directory.list_assigned_wabas().await
    }

    /// List every assigned WABA with its phone numbers.
    ///
    /// Lookups run up to `fan_out` at a time but items keep directory
    /// order. A WABA without an id, or one already listed, is skipped. A
    /// failed or panicking lookup becomes that WABA's `error`.
    pub async fn get_wabas_with_phone_numbers(&self) -> ProvisioningReport {
        info!("Collecting phone numbers for assigned WABAs");
        let wabas = match self.directory.list_assigned_wabas().await {
            Ok(wabas) => wabas,
            Err(e) => return ProvisioningReport::error(e.message),
        };

        let mut seen = HashSet::new();
        let ids: Vec<String> = wabas
            .into_iter()
            .filter_map(|w| w.id)
            .filter(|id| {
                let fresh = seen.insert(id.clone());
                if !fresh {
                    warn!("WABA {} listed more than once; keeping the first", id);
                }
                fresh
            })
            .collect();

        let items: Vec<WabaEntry> = futures::stream::iter(ids)
            .map(|id| self.lookup(id))
            .buffered(self.fan_out)
            .collect()
            .await;

        let failed = items.iter().filter(|i| i.is_failed()).count();
        info!(
            "Collected {} WABAs ({} with phone number errors)",
            items.len(),
            failed
        );
        ProvisioningReport::success(items)
    }

    async fn lookup(&self, waba_id: String) -> WabaEntry {
        let outcome = AssertUnwindSafe(self.catalog.list_phone_numbers(&waba_id))
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(numbers)) => WabaEntry::listed(waba_id, numbers),
            Ok(Err(e)) => {
                error!(
                    "Failed to fetch phone numbers for WABA {}: {}",
                    waba_id, e.message
                );
                WabaEntry::failed(waba_id, e.message)
            }
            Err(panic) => {
                let cause = panic_message(panic.as_ref());
                error!("Phone number lookup for WABA {} panicked: {}", waba_id, cause);
                WabaEntry::failed(waba_id, format!("Phone numbers listing failed: {}", cause))
            }
        }
    }

    /// Register a phone number for Cloud API messaging with the configured PIN.
    ///
    /// The number is taken as unregistered; the outcome carries the state it
    /// moved to once the service has answered. A request refused locally,
    /// or lost in transport, leaves the state unreported.
    pub async fn register_phone_number(&self, phone_number_id: &str) -> OperationOutcome {
        let start = RegistrationStatus::Unregistered;
        match self.registrar.register(phone_number_id).await {
            Ok(()) => OperationOutcome::success("Phone number registered")
                .with_registration(start.after_registration(true)),
            Err(e) if e.is_remote() => OperationOutcome::error(e.message)
                .with_registration(start.after_registration(false)),
            Err(e) => OperationOutcome::error(e.message),
        }
    }

    /// Point a WABA's webhooks at `callback_url`, verified with `verify_token`.
    pub async fn override_callback_url(
        &self,
        waba_id: &str,
        callback_url: &str,
        verify_token: &str,
    ) -> OperationOutcome {
        match self
            .subscriptions
            .override_callback_url(waba_id, callback_url, verify_token)
            .await
        {
            Ok(()) => OperationOutcome::success("Callback URL overridden"),
            Err(e) => OperationOutcome::error(e.message),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
