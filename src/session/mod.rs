//! Wallet login and session lifecycle.
//!
//! The host application supplies the wallet SDK and UI sinks by implementing
//! [`WalletAuth`], [`Notifier`] and [`Navigator`]. The profile directory is
//! usually the bundled HTTP [`BackendClient`](crate::BackendClient).
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use warden_login::{BackendClient, BackendConfig, LoginTrigger, ProviderId, SessionOrchestrator};
//!
//! // 1. Implement WalletAuth, Notifier and Navigator for your app
//! // 2. Build the orchestrator
//! let directory = BackendClient::new(BackendConfig::from_env()?);
//! let orchestrator = SessionOrchestrator::new(wallet, directory, toasts, router);
//!
//! // 3. Restore on page load and listen for account switches
//! orchestrator.restore_session().await;
//! let mut link_requests = orchestrator.install_account_listener().expect("first install");
//!
//! // 4. Wire the login button
//! let trigger = LoginTrigger::new(orchestrator.clone());
//! trigger.trigger_login(ProviderId::MetaMask).await;
//! ```

mod error;
mod link;
mod login;
mod notify;
mod orchestrator;
mod traits;
mod types;

#[cfg(test)]
mod testing;

pub use error::ResolveError;
pub use link::PendingLinkRequest;
pub use login::{LoginOutcome, LoginTrigger};
pub use notify::{Navigator, Notification, Notifier, Route, Severity};
pub use orchestrator::SessionOrchestrator;
pub use traits::{BoxError, ProfileDirectory, WalletAuth};
pub use types::{ConnectOutcome, ProviderId, WalletIdentity};
