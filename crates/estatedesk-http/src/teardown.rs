//! Session teardown and session lifecycle events.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, warn};

use estatedesk_core::{CredentialStore, Navigator};

/// Capacity of the session event channel. Slow subscribers lag, they never
/// block the client.
pub(crate) const EVENT_CAPACITY: usize = 16;

/// Session lifecycle events broadcast by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A renewal cycle succeeded and a new credential is stored.
    Renewed,
    /// Renewal failed on an authenticated view; the application should show
    /// its login view.
    Expired,
}

/// Clears local session state after an unrecoverable renewal failure.
#[derive(Clone)]
pub(crate) struct SessionTeardown {
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionTeardown {
    pub(crate) fn new(
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
        events: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            store,
            navigator,
            events,
        }
    }

    /// Forget the credential and identity without signalling navigation.
    pub(crate) fn clear_local(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear credential store");
        }
    }

    /// Clear local state, then emit [`SessionEvent::Expired`] unless the user
    /// is already on a public view.
    pub(crate) fn run(&self) {
        self.clear_local();

        let route = self.navigator.current_route();
        if route.is_public() {
            info!(%route, "Session cleared on public route; no redirect");
            return;
        }

        info!(%route, "Session expired; signalling login redirect");
        // No subscribers is fine: the signal is fire-and-forget.
        let _ = self.events.send(SessionEvent::Expired);
    }

    pub(crate) fn renewed(&self) {
        let _ = self.events.send(SessionEvent::Renewed);
    }
}
