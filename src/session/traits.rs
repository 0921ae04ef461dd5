use std::future::Future;

use tokio::sync::broadcast;

use super::types::{ProviderId, WalletIdentity};
use crate::types::{Handle, ProfileRecord, TeamMember, WalletAddress};

/// Error type returned by host-implemented traits.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Consumer-provided wallet authentication SDK.
///
/// # Example
///
/// ```rust,ignore
/// impl WalletAuth for MyWallet {
///     async fn authenticate(
///         &self,
///         provider: ProviderId,
///     ) -> Result<Option<WalletIdentity>, BoxError> {
///         match self.sdk.authenticate(provider.as_str()).await? {
///             Some(user) => Ok(Some(user.try_into()?)),
///             None => Ok(None), // user closed the signature prompt
///         }
///     }
///     // ...
/// }
/// ```
pub trait WalletAuth: Send + Sync + 'static {
    /// Ask the wallet to sign in. `Ok(None)` means the user declined to sign.
    fn authenticate(
        &self,
        provider: ProviderId,
    ) -> impl Future<Output = Result<Option<WalletIdentity>, BoxError>> + Send;

    /// The currently authenticated identity, if any.
    fn current(&self) -> impl Future<Output = Result<Option<WalletIdentity>, BoxError>> + Send;

    /// Persist changes made to an identity.
    fn save(&self, identity: &WalletIdentity) -> impl Future<Output = Result<(), BoxError>> + Send;

    /// Link another address to the current identity.
    fn link(&self, address: &WalletAddress) -> impl Future<Output = Result<(), BoxError>> + Send;

    /// Invalidate the wallet-auth session.
    fn logout(&self) -> impl Future<Output = Result<(), BoxError>> + Send;

    /// Stream of account switches reported by the wallet.
    fn account_changes(&self) -> broadcast::Receiver<WalletAddress>;
}

/// Lookup of warden profiles and teams.
///
/// Implemented by [`BackendClient`](crate::BackendClient) over HTTP.
pub trait ProfileDirectory: Send + Sync + 'static {
    /// Profile registered under `handle`, or `None` if there is none.
    fn find_profile(
        &self,
        handle: &Handle,
    ) -> impl Future<Output = Result<Option<ProfileRecord>, BoxError>> + Send;

    /// Team memberships of `handle`.
    fn find_team(
        &self,
        handle: &Handle,
    ) -> impl Future<Output = Result<Vec<TeamMember>, BoxError>> + Send;

    /// Handles previously registered with `address`.
    fn handles_for_address(
        &self,
        address: &WalletAddress,
    ) -> impl Future<Output = Result<Vec<Handle>, BoxError>> + Send;

    /// Public URL for a stored avatar path, or the path itself if it can't be resolved.
    fn resolve_avatar(&self, image: &str) -> impl Future<Output = String> + Send;
}
