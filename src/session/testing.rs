//! In-memory fakes of the host traits.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{Notify, broadcast};

use super::notify::{Navigator, Notification, Notifier, Route};
use super::orchestrator::SessionOrchestrator;
use super::traits::{BoxError, ProfileDirectory, WalletAuth};
use super::types::{ProviderId, WalletIdentity};
use crate::types::{Handle, ProfileRecord, TeamMember, WalletAddress};

pub(crate) fn address(n: u8) -> WalletAddress {
    format!("0x{n:040x}").parse().unwrap()
}

pub(crate) fn handle(s: &str) -> Handle {
    s.parse().unwrap()
}

pub(crate) fn setup(
    wallet: FakeWallet,
    directory: FakeDirectory,
) -> (Arc<SessionOrchestrator<FakeWallet, FakeDirectory>>, Notes, Routes) {
    let notes = Notes::default();
    let routes = Routes::default();
    let orch = SessionOrchestrator::new(wallet, directory, notes.clone(), routes.clone());
    (orch, notes, routes)
}

#[derive(Default)]
struct WalletState {
    identity: Option<WalletIdentity>,
    decline: bool,
    fail_authenticate: bool,
    fail_link: bool,
    fail_logout: bool,
    logouts: usize,
    saved: Vec<WalletIdentity>,
    linked: Vec<WalletAddress>,
}

pub(crate) struct FakeWallet {
    state: Mutex<WalletState>,
    events: broadcast::Sender<WalletAddress>,
}

impl Default for FakeWallet {
    fn default() -> Self {
        Self {
            state: Mutex::default(),
            events: broadcast::channel(16).0,
        }
    }
}

impl FakeWallet {
    pub(crate) fn with_identity(identity: WalletIdentity) -> Self {
        let wallet = Self::default();
        wallet.state.lock().unwrap().identity = Some(identity);
        wallet
    }

    fn configure(self, f: impl FnOnce(&mut WalletState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub(crate) fn failing_authenticate(self) -> Self {
        self.configure(|s| s.fail_authenticate = true)
    }

    pub(crate) fn failing_link(self) -> Self {
        self.configure(|s| s.fail_link = true)
    }

    pub(crate) fn failing_logout(self) -> Self {
        self.configure(|s| s.fail_logout = true)
    }

    pub(crate) fn decline_signature(&self) {
        self.state.lock().unwrap().decline = true;
    }

    pub(crate) fn events(&self) -> broadcast::Sender<WalletAddress> {
        self.events.clone()
    }

    pub(crate) fn logout_count(&self) -> usize {
        self.state.lock().unwrap().logouts
    }

    pub(crate) fn saved(&self) -> Vec<WalletIdentity> {
        self.state.lock().unwrap().saved.clone()
    }

    pub(crate) fn linked(&self) -> Vec<WalletAddress> {
        self.state.lock().unwrap().linked.clone()
    }
}

impl WalletAuth for FakeWallet {
    async fn authenticate(
        &self,
        _provider: ProviderId,
    ) -> Result<Option<WalletIdentity>, BoxError> {
        let state = self.state.lock().unwrap();
        if state.fail_authenticate {
            return Err("wallet unavailable".into());
        }
        if state.decline {
            return Ok(None);
        }
        Ok(state.identity.clone())
    }

    async fn current(&self) -> Result<Option<WalletIdentity>, BoxError> {
        Ok(self.state.lock().unwrap().identity.clone())
    }

    async fn save(&self, identity: &WalletIdentity) -> Result<(), BoxError> {
        let mut state = self.state.lock().unwrap();
        state.saved.push(identity.clone());
        state.identity = Some(identity.clone());
        Ok(())
    }

    async fn link(&self, address: &WalletAddress) -> Result<(), BoxError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_link {
            return Err("link rejected".into());
        }
        state.linked.push(address.clone());
        if let Some(identity) = state.identity.as_mut() {
            identity.linked_addresses.push(address.clone());
        }
        Ok(())
    }

    async fn logout(&self) -> Result<(), BoxError> {
        let mut state = self.state.lock().unwrap();
        state.logouts += 1;
        if state.fail_logout {
            return Err("logout failed".into());
        }
        state.identity = None;
        Ok(())
    }

    fn account_changes(&self) -> broadcast::Receiver<WalletAddress> {
        self.events.subscribe()
    }
}

#[derive(Default)]
pub(crate) struct FakeDirectory {
    profiles: HashMap<Handle, ProfileRecord>,
    teams: HashMap<Handle, Vec<TeamMember>>,
    address_handles: HashMap<WalletAddress, Vec<Handle>>,
    avatars: HashMap<String, String>,
    fail_profiles: bool,
    fail_teams: bool,
    gate: Option<Arc<Notify>>,
    profile_lookups: AtomicUsize,
}

impl FakeDirectory {
    pub(crate) fn with_profile(mut self, name: &str, record: ProfileRecord) -> Self {
        self.profiles.insert(handle(name), record);
        self
    }

    pub(crate) fn with_team(mut self, name: &str, members: Vec<TeamMember>) -> Self {
        self.teams.insert(handle(name), members);
        self
    }

    pub(crate) fn with_address_handles(
        mut self,
        address: WalletAddress,
        handles: Vec<Handle>,
    ) -> Self {
        self.address_handles.insert(address, handles);
        self
    }

    pub(crate) fn with_avatar(mut self, image: &str, url: &str) -> Self {
        self.avatars.insert(image.to_owned(), url.to_owned());
        self
    }

    pub(crate) fn failing_profiles(mut self) -> Self {
        self.fail_profiles = true;
        self
    }

    pub(crate) fn failing_teams(mut self) -> Self {
        self.fail_teams = true;
        self
    }

    /// Profile lookups wait until `gate` is notified.
    pub(crate) fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub(crate) fn profile_lookups(&self) -> usize {
        self.profile_lookups.load(Ordering::Acquire)
    }
}

impl ProfileDirectory for FakeDirectory {
    async fn find_profile(&self, handle: &Handle) -> Result<Option<ProfileRecord>, BoxError> {
        self.profile_lookups.fetch_add(1, Ordering::AcqRel);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail_profiles {
            return Err("get-user failed with status 502".into());
        }
        Ok(self.profiles.get(handle).cloned())
    }

    async fn find_team(&self, handle: &Handle) -> Result<Vec<TeamMember>, BoxError> {
        if self.fail_teams {
            return Err("get-team failed with status 500".into());
        }
        Ok(self.teams.get(handle).cloned().unwrap_or_default())
    }

    async fn handles_for_address(&self, address: &WalletAddress) -> Result<Vec<Handle>, BoxError> {
        Ok(self.address_handles.get(address).cloned().unwrap_or_default())
    }

    async fn resolve_avatar(&self, image: &str) -> String {
        self.avatars
            .get(image)
            .cloned()
            .unwrap_or_else(|| image.to_owned())
    }
}

#[derive(Clone, Default)]
pub(crate) struct Notes(Arc<Mutex<Vec<Notification>>>);

impl Notes {
    pub(crate) fn messages(&self) -> Vec<Notification> {
        self.0.lock().unwrap().clone()
    }
}

impl Notifier for Notes {
    fn notify(&self, notification: Notification) {
        self.0.lock().unwrap().push(notification);
    }
}

#[derive(Clone, Default)]
pub(crate) struct Routes(Arc<Mutex<Vec<Route>>>);

impl Routes {
    pub(crate) fn routes(&self) -> Vec<Route> {
        self.0.lock().unwrap().clone()
    }
}

impl Navigator for Routes {
    fn navigate(&self, route: Route) {
        self.0.lock().unwrap().push(route);
    }
}
