//! **waba-provisioner**: process wiring for WABA provisioning.
//!
//! Loads configuration, installs logging, resolves bearer tokens and
//! builds the services from the member crates.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |---|---|
//! | [`config`] | `AppConfig` from environment variables and `.env` |
//! | [`logging`] | Global subscriber honouring `RUST_LOG` |
//! | [`credentials`] | `AppTokenSource` routing each audience to its credential |
//! | [`app`] | `App`: orchestrator, business profiles, notifications |

pub mod app;
pub mod config;
pub mod credentials;
pub mod logging;

pub use app::App;
pub use config::{AppConfig, ConfigError};
pub use credentials::AppTokenSource;
pub use logging::init_logging;

pub use waba_core::{ApiError, ApiErrorCode, Audience, TokenSource};
pub use waba_mail::NotificationSender;
pub use waba_whatsapp::{
    OperationOutcome, ProvisioningOrchestrator, ProvisioningReport, RegistrationStatus,
    UpdateBusinessProfile, WabaEntry,
};
