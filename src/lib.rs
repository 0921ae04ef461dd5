#![doc = include_str!("../README.md")]

#[cfg(feature = "http")]
pub mod backend;
pub mod error;
pub mod session;
pub mod types;

// Re-exports for convenient access
#[cfg(feature = "http")]
pub use backend::{BackendClient, BackendConfig};
pub use error::Error;
pub use session::{
    BoxError, ConnectOutcome, LoginOutcome, LoginTrigger, Navigator, Notification, Notifier,
    PendingLinkRequest, ProfileDirectory, ProviderId, ResolveError, Route, SessionOrchestrator,
    Severity, WalletAuth, WalletIdentity,
};
pub use types::{ExternalUserId, Handle, ProfileRecord, Session, TeamMember, WalletAddress};
