use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, mpsc, watch};

use super::error::ResolveError;
use super::link::PendingLinkRequest;
use super::notify::{Navigator, Notification, Notifier, Route};
use super::traits::{ProfileDirectory, WalletAuth};
use super::types::{ConnectOutcome, WalletIdentity};
use crate::types::{Session, WalletAddress};

/// Owner of the live [`Session`] and the login state machine around it.
///
/// Created behind an `Arc` since the account listener and link requests
/// hold on to it.
pub struct SessionOrchestrator<W, D> {
    pub(super) wallet: W,
    directory: D,
    pub(super) notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    session: watch::Sender<Session>,
    // Serializes resolution so two commits can't interleave.
    resolving: Mutex<()>,
    // Bumped on every logout; a resolution only commits if it is unchanged.
    epoch: AtomicU64,
    listener_installed: AtomicBool,
}

impl<W: WalletAuth, D: ProfileDirectory> SessionOrchestrator<W, D> {
    #[must_use]
    pub fn new(
        wallet: W,
        directory: D,
        notifier: impl Notifier,
        navigator: impl Navigator,
    ) -> Arc<Self> {
        let (session, _) = watch::channel(Session::empty());
        Arc::new(Self {
            wallet,
            directory,
            notifier: Arc::new(notifier),
            navigator: Arc::new(navigator),
            session,
            resolving: Mutex::new(()),
            epoch: AtomicU64::new(0),
            listener_installed: AtomicBool::new(false),
        })
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    /// Receiver that observes every session replacement.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Replace the session unless a logout happened since `epoch` was read.
    ///
    /// The check runs under the session cell's lock, so it can't race with
    /// [`logout`](Self::logout).
    fn commit(&self, epoch: u64, session: Session) -> bool {
        self.session.send_if_modified(|current| {
            if self.epoch.load(Ordering::Acquire) != epoch {
                return false;
            }
            *current = session;
            true
        })
    }

    /// Clear the session and invalidate the wallet-auth session.
    ///
    /// Always succeeds locally; wallet failures are only logged. Any
    /// resolution still in flight is discarded instead of committed.
    pub async fn logout(&self) {
        self.session.send_modify(|current| {
            self.epoch.fetch_add(1, Ordering::AcqRel);
            *current = Session::empty();
        });
        if let Err(e) = self.wallet.logout().await {
            tracing::warn!(error = %e, "Wallet logout failed");
        }
        tracing::info!("Logged out");
    }

    /// Rebuild the session from whatever identity the wallet currently holds.
    ///
    /// Call on startup and whenever the wallet reports a new identity.
    pub async fn restore_session(&self) {
        let _guard = self.resolving.lock().await;
        let epoch = self.epoch();

        let identity = match self.wallet.current().await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                self.commit(epoch, Session::empty());
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Identity lookup failed during restore");
                self.logout().await;
                return;
            }
        };

        match self.resolve_profile(&identity).await {
            Ok(session) => {
                if self.commit(epoch, session) {
                    tracing::info!(address = %identity.address, "Session restored");
                } else {
                    tracing::debug!(address = %identity.address, "Logged out during restore");
                }
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    address = %identity.address,
                    "Invalid session on restore"
                );
                self.logout().await;
            }
        }
    }

    /// Build a full session for `identity` from its profile and team.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::InvalidLocalState`] if the identity has no handle.
    /// - [`ResolveError::PendingRegistration`] if no profile exists for the handle.
    /// - [`ResolveError::PendingLinking`] if the profile has no linked user id.
    /// - [`ResolveError::Unknown`] if the profile lookup fails.
    pub async fn resolve_profile(
        &self,
        identity: &WalletIdentity,
    ) -> Result<Session, ResolveError> {
        let handle = identity
            .handle
            .as_ref()
            .ok_or(ResolveError::InvalidLocalState("identity has no handle"))?;

        let record = self
            .directory
            .find_profile(handle)
            .await
            .map_err(ResolveError::unknown)?
            .ok_or_else(|| {
                tracing::debug!(handle = %handle, "No profile registered");
                ResolveError::PendingRegistration
            })?;

        let external_user_id = record.linked_user_id().ok_or_else(|| {
            tracing::debug!(handle = %handle, "Profile has no linked account");
            ResolveError::PendingLinking
        })?;

        let teams = match self.directory.find_team(handle).await {
            Ok(teams) => teams,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    handle = %handle,
                    "Team lookup failed, continuing without teams"
                );
                Vec::new()
            }
        };

        let avatar_url = match record.image.as_deref() {
            Some(image) => Some(self.directory.resolve_avatar(image).await),
            None => None,
        };

        Ok(Session::new(handle.clone(), external_user_id)
            .with_address(identity.address.clone())
            .with_discord_handle(identity.discord_handle.clone())
            .with_github_handle(identity.github_handle.clone())
            .with_email(identity.email.clone())
            .with_teams(teams)
            .with_avatar_url(avatar_url)
            .with_profile_link(record.link))
    }

    /// Finish a login after the wallet has authenticated.
    ///
    /// Either commits a session or sends the user to a recovery screen.
    ///
    /// # Errors
    ///
    /// Any [`ResolveError`] from [`resolve_profile`](Self::resolve_profile), plus
    /// [`ResolveError::InvalidLocalState`] when the wallet reports no identity,
    /// and [`ResolveError::Superseded`] when a logout happened meanwhile.
    pub async fn connect_and_resolve(&self) -> Result<ConnectOutcome, ResolveError> {
        let _guard = self.resolving.lock().await;
        let epoch = self.epoch();

        let mut identity = self
            .wallet
            .current()
            .await
            .map_err(ResolveError::unknown)?
            .ok_or(ResolveError::InvalidLocalState("no authenticated identity"))?;

        if identity.awaiting_confirmation() {
            return Ok(self.redirect(Route::ConfirmAccount));
        }

        if identity.handle.is_none() {
            let handles = self
                .directory
                .handles_for_address(&identity.address)
                .await
                .map_err(ResolveError::unknown)?;

            if handles.is_empty() {
                tracing::info!(address = %identity.address, "Unregistered address");
                self.logout().await;
                return Ok(self.redirect(Route::Register));
            }

            identity.handles_pending_confirmation = handles;
            self.wallet
                .save(&identity)
                .await
                .map_err(ResolveError::unknown)?;
            return Ok(self.redirect(Route::ConfirmAccount));
        }

        let session = self.resolve_profile(&identity).await?;
        if !self.commit(epoch, session) {
            tracing::warn!(
                address = %identity.address,
                "Logged out during login, discarding session"
            );
            return Err(ResolveError::Superseded);
        }
        tracing::info!(address = %identity.address, "Login successful");
        Ok(ConnectOutcome::Connected)
    }

    fn redirect(&self, route: Route) -> ConnectOutcome {
        self.navigator.navigate(route);
        ConnectOutcome::Redirected(route)
    }

    /// React to the wallet switching to `new_address`.
    ///
    /// Returns a link request when the user has to decide whether the new
    /// address joins their account. Every other path ends in a logout.
    pub async fn on_account_changed(
        self: &Arc<Self>,
        new_address: WalletAddress,
    ) -> Option<PendingLinkRequest<W, D>> {
        let identity = match self.wallet.current().await {
            Ok(Some(identity)) => identity,
            Ok(None) => return self.disconnect(Notification::wallet_disconnected()).await,
            Err(e) => {
                tracing::warn!(error = %e, "Identity lookup failed after account change");
                return self.disconnect(Notification::wallet_disconnected()).await;
            }
        };

        if identity.linked_addresses.is_empty() {
            return self.disconnect(Notification::wallet_disconnected()).await;
        }
        let Some(owner_handle) = identity.handle else {
            return self.disconnect(Notification::registered_users_only()).await;
        };

        if identity.linked_addresses.contains(&new_address) {
            tracing::debug!(address = %new_address, "Switched to an already linked address");
            return None;
        }

        Some(PendingLinkRequest::new(
            Arc::clone(self),
            new_address,
            owner_handle,
        ))
    }

    async fn disconnect(&self, notification: Notification) -> Option<PendingLinkRequest<W, D>> {
        self.notifier.notify(notification);
        self.logout().await;
        None
    }

    /// Start consuming the wallet's account-change events.
    ///
    /// Only the first call installs the listener and gets the receiver of
    /// link requests; later calls return `None`. Must be called inside a
    /// tokio runtime. The listener stops once the orchestrator is dropped.
    pub fn install_account_listener(
        self: &Arc<Self>,
    ) -> Option<mpsc::UnboundedReceiver<PendingLinkRequest<W, D>>> {
        if self.listener_installed.swap(true, Ordering::AcqRel) {
            tracing::warn!("Account listener already installed");
            return None;
        }

        let mut changes = self.wallet.account_changes();
        let (tx, rx) = mpsc::unbounded_channel();
        let this: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(address) => {
                        let Some(orchestrator) = this.upgrade() else {
                            break;
                        };
                        let Some(request) = orchestrator.on_account_changed(address).await else {
                            continue;
                        };
                        if let Err(mpsc::error::SendError(request)) = tx.send(request) {
                            tracing::warn!("No one to confirm link request, declining");
                            request.decline().await;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Account change events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            tracing::debug!("Account listener stopped");
        });

        Some(rx)
    }
}
