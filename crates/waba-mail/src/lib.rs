//! **waba-mail**: acknowledgement email delivery.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |---|---|
//! | [`types`] | Mail configuration, cached token, `sendMail` payload |
//! | [`auth`] | OAuth2 client-credentials `TokenSource` for the mail audience |
//! | [`sender`] | `NotificationSender`: one best-effort `sendMail` call |

pub mod types;
pub mod auth;
pub mod sender;

pub use auth::ClientCredentialsTokenSource;
pub use sender::NotificationSender;
pub use types::{MailConfig, SendMailRequest};
