use std::sync::Arc;

use super::error::ResolveError;
use super::notify::Notification;
use super::orchestrator::SessionOrchestrator;
use super::traits::{ProfileDirectory, WalletAuth};
use crate::types::{Handle, WalletAddress};

/// The wallet switched to an address that isn't linked yet.
///
/// The user must either [`confirm`](Self::confirm) linking it to
/// `owner_handle` or [`decline`](Self::decline), which logs them out.
/// Dropping the request without answering leaves the session as it is.
pub struct PendingLinkRequest<W, D> {
    orchestrator: Arc<SessionOrchestrator<W, D>>,
    candidate_address: WalletAddress,
    owner_handle: Handle,
}

impl<W, D> std::fmt::Debug for PendingLinkRequest<W, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingLinkRequest")
            .field("candidate_address", &self.candidate_address)
            .field("owner_handle", &self.owner_handle)
            .finish_non_exhaustive()
    }
}

impl<W: WalletAuth, D: ProfileDirectory> PendingLinkRequest<W, D> {
    pub(super) fn new(
        orchestrator: Arc<SessionOrchestrator<W, D>>,
        candidate_address: WalletAddress,
        owner_handle: Handle,
    ) -> Self {
        Self {
            orchestrator,
            candidate_address,
            owner_handle,
        }
    }

    #[must_use]
    pub fn candidate_address(&self) -> &WalletAddress {
        &self.candidate_address
    }

    #[must_use]
    pub fn owner_handle(&self) -> &Handle {
        &self.owner_handle
    }

    /// Link the new address and refresh the session.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Unknown`] if the wallet refuses the link. The
    /// user is notified and logged out in that case.
    pub async fn confirm(self) -> Result<(), ResolveError> {
        let orchestrator = self.orchestrator;
        if let Err(e) = orchestrator.wallet.link(&self.candidate_address).await {
            tracing::error!(error = %e, address = %self.candidate_address, "Address link failed");
            orchestrator.notifier.notify(Notification::failed());
            orchestrator.logout().await;
            return Err(ResolveError::unknown(e));
        }

        tracing::info!(
            address = %self.candidate_address,
            handle = %self.owner_handle,
            "Address linked"
        );
        orchestrator
            .notifier
            .notify(Notification::address_linked(&self.candidate_address));
        orchestrator.restore_session().await;
        Ok(())
    }

    /// Refuse the new address; the user is logged out.
    pub async fn decline(self) {
        tracing::info!(address = %self.candidate_address, "Address link declined");
        self.orchestrator.logout().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::WalletIdentity;
    use crate::session::testing::*;
    use crate::types::{ProfileRecord, Session};

    fn alice() -> WalletIdentity {
        WalletIdentity::new(address(1)).with_handle(handle("alice"))
    }

    #[tokio::test]
    async fn confirm_links_and_restores() {
        let directory = FakeDirectory::default()
            .with_profile("alice", ProfileRecord::new().with_external_user_id("m1"));
        let (orch, notes, _) = setup(FakeWallet::with_identity(alice()), directory);
        let request = orch.on_account_changed(address(2)).await.unwrap();

        request.confirm().await.unwrap();

        assert_eq!(orch.wallet.linked(), vec![address(2)]);
        assert_eq!(notes.messages(), vec![Notification::address_linked(&address(2))]);
        assert!(orch.session().is_logged_in());
    }

    #[tokio::test]
    async fn failed_link_logs_out() {
        let wallet = FakeWallet::with_identity(alice()).failing_link();
        let (orch, notes, _) = setup(wallet, FakeDirectory::default());
        let request = orch.on_account_changed(address(2)).await.unwrap();

        assert!(matches!(request.confirm().await, Err(ResolveError::Unknown(_))));
        assert_eq!(notes.messages(), vec![Notification::failed()]);
        assert_eq!(orch.wallet.logout_count(), 1);
    }

    #[tokio::test]
    async fn decline_logs_out() {
        let (orch, _, _) = setup(FakeWallet::with_identity(alice()), FakeDirectory::default());
        let request = orch.on_account_changed(address(2)).await.unwrap();

        request.decline().await;

        assert!(orch.wallet.linked().is_empty());
        assert_eq!(orch.wallet.logout_count(), 1);
        assert_eq!(orch.session(), Session::empty());
    }
}
