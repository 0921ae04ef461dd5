use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::error::ResolveError;
use super::notify::Notification;
use super::orchestrator::SessionOrchestrator;
use super::traits::{ProfileDirectory, WalletAuth};
use super::types::{ConnectOutcome, ProviderId};

/// How a single login attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success,
    /// The user closed the wallet's signature prompt.
    UserCancelled,
    /// The address has no warden registration.
    Unregistered,
    PendingRegistration,
    PendingLinking,
    Failed(String),
}

impl LoginOutcome {
    /// Toast shown for this outcome.
    #[must_use]
    pub fn notification(&self) -> Notification {
        match self {
            Self::Success => Notification::logged_in(),
            Self::UserCancelled => Notification::must_sign(),
            Self::Unregistered => Notification::must_register(),
            Self::PendingRegistration => Notification::registration_pending(),
            Self::PendingLinking => Notification::linking_pending(),
            Self::Failed(_) => Notification::failed(),
        }
    }
}

/// Login button action.
///
/// Each call to [`trigger_login`](Self::trigger_login) is an independent
/// attempt. Overlapping attempts are not deduplicated; disable the button
/// while [`is_in_flight`](Self::is_in_flight) is true.
pub struct LoginTrigger<W, D> {
    orchestrator: Arc<SessionOrchestrator<W, D>>,
    in_flight: AtomicUsize,
}

impl<W: WalletAuth, D: ProfileDirectory> LoginTrigger<W, D> {
    #[must_use]
    pub fn new(orchestrator: Arc<SessionOrchestrator<W, D>>) -> Self {
        Self {
            orchestrator,
            in_flight: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) > 0
    }

    /// Authenticate with `provider` and finish the login.
    ///
    /// The outcome is also sent to the notifier.
    pub async fn trigger_login(&self, provider: ProviderId) -> LoginOutcome {
        let outcome = {
            let _in_flight = InFlight::enter(&self.in_flight);
            self.attempt(provider).await
        };

        self.orchestrator.notifier.notify(outcome.notification());
        outcome
    }

    async fn attempt(&self, provider: ProviderId) -> LoginOutcome {
        let orchestrator = &self.orchestrator;

        match orchestrator.wallet.authenticate(provider).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::debug!(%provider, "Signature declined");
                return LoginOutcome::UserCancelled;
            }
            Err(e) => {
                tracing::error!(error = %e, %provider, "Wallet authentication failed");
                orchestrator.logout().await;
                return LoginOutcome::Failed(e.to_string());
            }
        }

        let outcome = match orchestrator.connect_and_resolve().await {
            Ok(ConnectOutcome::Connected) => return LoginOutcome::Success,
            Ok(ConnectOutcome::Redirected(_)) => return LoginOutcome::Unregistered,
            Err(ResolveError::PendingRegistration) => LoginOutcome::PendingRegistration,
            Err(ResolveError::PendingLinking) => LoginOutcome::PendingLinking,
            Err(e) => {
                tracing::error!(error = %e, %provider, "Login failed");
                LoginOutcome::Failed(e.to_string())
            }
        };
        orchestrator.logout().await;
        outcome
    }
}

/// Counts an attempt as in flight until dropped, even if the future is cancelled.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(count: &'a AtomicUsize) -> Self {
        count.fetch_add(1, Ordering::AcqRel);
        Self(count)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}
