//! # waba-whatsapp: WABA provisioning over the Meta Graph API
//!
//! Built against **Graph API v23.0**.
//!
//! ## Capabilities
//!
//! - **Directory** – WABAs assigned to the tech provider's business portfolio,
//!   filtered by client business, following `paging.next`.
//! - **Phone Numbers** – per-WABA listing, wrapped or bare payloads normalised.
//! - **Registration** – register a phone number for Cloud API messaging.
//! - **Subscriptions** – override a WABA's webhook callback URL and verify token.
//! - **Business Profile** – get/update the profile behind a phone number.
//! - **Orchestrator** – one report over every assigned WABA with per-WABA
//!   failure isolation and bounded, order-preserving fan-out.

pub mod types;
pub mod api_client;
pub mod directory;
pub mod phone_numbers;
pub mod registration;
pub mod subscriptions;
pub mod business_profile;
pub mod orchestrator;

// Re-exports
pub use api_client::GraphClient;
pub use business_profile::{BusinessProfile, BusinessProfileManager, UpdateBusinessProfile};
pub use directory::{WabaDirectory, WabaSource};
pub use orchestrator::ProvisioningOrchestrator;
pub use phone_numbers::{normalize_phone_numbers, PhoneNumberCatalog, PhoneNumberSource};
pub use registration::PhoneRegistrar;
pub use subscriptions::WabaSubscriptions;
pub use types::*;
