//! Single-flight credential renewal.
//!
//! The first caller to hit a renewable failure becomes the leader and performs
//! the renewal. Callers arriving while it is in flight park a oneshot
//! continuation in the waiter queue and are released, in arrival order, when
//! the leader settles.
//!
//! The state check and the transition happen under one synchronous lock with
//! no await in between, which is what keeps a second caller from slipping in
//! and starting its own renewal. Settling rejects or resolves the waiters,
//! runs the leader's follow-up (teardown on failure) and only then returns to
//! idle, so nobody can start a new cycle against a credential that is about
//! to be cleared.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::oneshot;
use tracing::{debug, warn};

use estatedesk_core::Result;
use estatedesk_core::error::AuthError;

type Waiter = oneshot::Sender<Result<()>>;

/// The waiter queue only exists while a renewal is in flight.
#[derive(Debug, Default)]
enum RenewalState {
    #[default]
    Idle,
    Renewing { waiters: VecDeque<Waiter> },
}

/// Owns the renewal state for one client.
///
/// Each [`ApiClient`](crate::ApiClient) gets its own coordinator, so separate
/// clients never share renewal state.
#[derive(Debug, Default)]
pub struct RenewalCoordinator {
    state: Mutex<RenewalState>,
}

/// A caller's role in the current renewal cycle.
pub(crate) enum Turn<'a> {
    /// Perform the renewal, then call [`LeaderGuard::finish`].
    Lead(LeaderGuard<'a>),
    /// Wait for the leader's outcome.
    Wait(oneshot::Receiver<Result<()>>),
}

impl RenewalCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while a renewal call is in flight.
    pub fn is_renewing(&self) -> bool {
        matches!(*self.lock(), RenewalState::Renewing { .. })
    }

    /// Number of callers parked behind the in-flight renewal.
    pub fn waiting(&self) -> usize {
        match &*self.lock() {
            RenewalState::Idle => 0,
            RenewalState::Renewing { waiters } => waiters.len(),
        }
    }

    /// Become the leader if idle, otherwise join the queue.
    pub(crate) fn join(&self) -> Turn<'_> {
        let mut state = self.lock();
        match &mut *state {
            RenewalState::Idle => {
                *state = RenewalState::Renewing {
                    waiters: VecDeque::new(),
                };
                debug!("Starting renewal cycle");
                Turn::Lead(LeaderGuard {
                    coordinator: self,
                    settled: false,
                })
            }
            RenewalState::Renewing { waiters } => {
                let (tx, rx) = oneshot::channel();
                waiters.push_back(tx);
                debug!(position = waiters.len(), "Queued behind in-flight renewal");
                Turn::Wait(rx)
            }
        }
    }

    /// Release every waiter with `outcome`, run `before_idle`, then return
    /// to idle. Callers that queue while `before_idle` runs get the same
    /// outcome.
    fn settle(&self, outcome: &Result<()>, before_idle: impl FnOnce()) -> usize {
        let mut released = release(self.drain(), outcome);

        before_idle();

        if let RenewalState::Renewing { waiters } = std::mem::take(&mut *self.lock()) {
            released += release(waiters, outcome);
        }
        released
    }

    /// Empty the queue but stay in `Renewing`.
    fn drain(&self) -> VecDeque<Waiter> {
        match &mut *self.lock() {
            RenewalState::Idle => VecDeque::new(),
            RenewalState::Renewing { waiters } => std::mem::take(waiters),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RenewalState> {
        // The state is replaced wholesale, so a poisoned value is still coherent.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Resolve waiters in arrival order.
fn release(waiters: VecDeque<Waiter>, outcome: &Result<()>) -> usize {
    let released = waiters.len();
    for waiter in waiters {
        // A closed receiver means that caller was cancelled; nothing to do.
        let _ = waiter.send(outcome.clone());
    }
    released
}

/// Held by the leader for the duration of the renewal call.
///
/// Dropping it without calling [`finish`](Self::finish) (for example when the
/// leader's future is cancelled) rejects every waiter with
/// [`AuthError::RenewalAbandoned`] so nobody waits forever.
pub(crate) struct LeaderGuard<'a> {
    coordinator: &'a RenewalCoordinator,
    settled: bool,
}

impl LeaderGuard<'_> {
    /// Drain the queue with the renewal's outcome, then run `before_idle`
    /// while the coordinator still reports a renewal in flight. Returns the
    /// number of waiters released.
    pub(crate) fn finish(mut self, outcome: &Result<()>, before_idle: impl FnOnce()) -> usize {
        self.settled = true;
        self.coordinator.settle(outcome, before_idle)
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let released = self
                .coordinator
                .settle(&Err(AuthError::RenewalAbandoned.into()), || {});
            warn!(released, "Renewal leader dropped before settling");
        }
    }
}
