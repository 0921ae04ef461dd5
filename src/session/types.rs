use serde::{Deserialize, Serialize};

use crate::types::{Handle, WalletAddress};

/// Wallet provider used for authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    MetaMask,
    WalletConnect,
}

impl ProviderId {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MetaMask => "metamask",
            Self::WalletConnect => "walletconnect",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated principal as reported by the wallet SDK.
///
/// `linked_addresses` lists every address the SDK has linked to this
/// principal. `handles_pending_confirmation` is the pending-confirmation
/// marker: handles that matched the address but are not yet confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct WalletIdentity {
    pub address: WalletAddress,
    pub handle: Option<Handle>,
    pub discord_handle: Option<String>,
    pub github_handle: Option<String>,
    pub email: Option<String>,
    pub linked_addresses: Vec<WalletAddress>,
    pub handles_pending_confirmation: Vec<Handle>,
}

impl WalletIdentity {
    #[must_use]
    pub fn new(address: WalletAddress) -> Self {
        Self {
            linked_addresses: vec![address.clone()],
            address,
            handle: None,
            discord_handle: None,
            github_handle: None,
            email: None,
            handles_pending_confirmation: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    #[must_use]
    pub fn with_discord_handle(mut self, handle: impl Into<String>) -> Self {
        self.discord_handle = Some(handle.into());
        self
    }

    #[must_use]
    pub fn with_github_handle(mut self, handle: impl Into<String>) -> Self {
        self.github_handle = Some(handle.into());
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_linked_addresses(mut self, addresses: Vec<WalletAddress>) -> Self {
        self.linked_addresses = addresses;
        self
    }

    #[must_use]
    pub fn with_handles_pending_confirmation(mut self, handles: Vec<Handle>) -> Self {
        self.handles_pending_confirmation = handles;
        self
    }

    /// Whether a handle match is waiting for the user to confirm it.
    #[must_use]
    pub fn awaiting_confirmation(&self) -> bool {
        !self.handles_pending_confirmation.is_empty()
    }
}

/// Result of [`connect_and_resolve`](super::SessionOrchestrator::connect_and_resolve).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Session committed.
    Connected,
    /// The user was sent to a recovery screen instead.
    Redirected(super::Route),
}
