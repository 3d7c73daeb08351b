//! **waba-core**: remote-call plumbing shared by the provisioning and mail crates.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |---|---|
//! | [`error`] | Uniform `ApiError` / `ApiResult` used at every remote boundary |
//! | [`http`] | `RemoteApiClient`: one request in, classified result out |
//! | [`token`] | `TokenSource` trait, `Audience`, `AuthError`, static token store |

pub mod error;
pub mod http;
pub mod token;

pub use error::{ApiError, ApiErrorCode, ApiResult};
pub use http::{RemoteApiClient, RemoteRequest, RequestBody, WHATSAPP_ACCEPTED};
pub use token::{Audience, AuthError, StaticTokenSource, TokenSource};
