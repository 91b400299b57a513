//! Maturity gate
//!
//! Bridges the ledger's push-style change notifications to the orchestrator's
//! "wait until transaction T has matured" step.
//!
//! - One listener task per gate drains the [`ChangeStream`] for the whole run.
//! - Correlation is by exact transaction id (the event's associated id and the
//!   creating transaction of every added outpoint), never by address alone.
//! - Every observed id lands in a bounded buffer of recent matches, so an event
//!   that arrives between broadcast and `await_maturity` is not lost.
//! - Waits are bounded by a deadline and can be cancelled; an event arriving
//!   after a wait gave up only updates the buffer.

mod cancel;

pub use cancel::{CancelHandle, CancelToken};

use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::ledger::ChangeStream;
use crate::types::{ChangeEvent, TransactionId};

/// Default number of recently observed transaction ids kept for late waiters
pub const DEFAULT_RECENT_CAPACITY: usize = 64;

/// How a maturity wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaturityOutcome {
    Matured,
    TimedOut,
    Cancelled,
}

#[derive(Debug)]
struct Waiter {
    transaction_id: TransactionId,
    notify: oneshot::Sender<()>,
}

#[derive(Debug)]
struct GateState {
    recent: VecDeque<TransactionId>,
    capacity: usize,
    waiter: Option<Waiter>,
    events_seen: u64,
}

impl GateState {
    fn new(capacity: usize) -> Self {
        Self {
            recent: VecDeque::with_capacity(capacity),
            capacity,
            waiter: None,
            events_seen: 0,
        }
    }

    fn observe(&mut self, event: &ChangeEvent) {
        self.events_seen += 1;

        for transaction_id in event.transaction_ids() {
            let matches_waiter = self
                .waiter
                .as_ref()
                .is_some_and(|waiter| waiter.transaction_id == *transaction_id);

            if matches_waiter {
                if let Some(waiter) = self.waiter.take() {
                    debug!(
                        "Maturity evidence for {} on {}",
                        transaction_id, event.address
                    );
                    let _ = waiter.notify.send(());
                }
            }

            self.remember(*transaction_id);
        }
    }

    /// Most recently seen ids sit at the back; a repeat moves back there
    fn remember(&mut self, transaction_id: TransactionId) {
        if let Some(position) = self.recent.iter().position(|id| *id == transaction_id) {
            self.recent.remove(position);
        } else if self.recent.len() >= self.capacity {
            self.recent.pop_front();
        }
        self.recent.push_back(transaction_id);
    }
}

fn lock(state: &Mutex<GateState>) -> MutexGuard<'_, GateState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Correlates change notifications with awaited transaction ids
#[derive(Debug)]
pub struct MaturityGate {
    state: Arc<Mutex<GateState>>,
    listener: JoinHandle<()>,
}

impl MaturityGate {
    /// Start listening on `stream`, remembering the last `capacity` ids
    pub fn spawn(mut stream: ChangeStream, capacity: usize) -> Self {
        let state = Arc::new(Mutex::new(GateState::new(capacity.max(1))));

        let listener = tokio::spawn({
            let state = Arc::clone(&state);
            async move {
                while let Some(event) = stream.next().await {
                    debug!(
                        "Change event for {}: +{} -{} (tx {:?})",
                        event.address,
                        event.added.len(),
                        event.removed.len(),
                        event.transaction_id
                    );
                    lock(&state).observe(&event);
                }
                debug!("Change stream ended");
            }
        });

        Self { state, listener }
    }

    /// Whether `transaction_id` is in the recent-match buffer
    pub fn has_observed(&self, transaction_id: &TransactionId) -> bool {
        lock(&self.state).recent.contains(transaction_id)
    }

    /// Number of change events processed so far
    pub fn events_seen(&self) -> u64 {
        lock(&self.state).events_seen
    }

    /// Wait until `transaction_id` is observed, `timeout` elapses, or `cancel` fires
    ///
    /// Cancellation takes precedence: a cancelled token ends the wait even when
    /// the id was already observed. Otherwise resolves immediately for a
    /// buffered id. A timeout never resolves before the deadline, even if the
    /// change stream has ended.
    pub async fn await_maturity(
        &self,
        transaction_id: &TransactionId,
        timeout: Duration,
        cancel: &mut CancelToken,
    ) -> MaturityOutcome {
        let deadline = Instant::now() + timeout;

        if cancel.is_cancelled() {
            debug!("Wait for {} cancelled before it started", transaction_id);
            return MaturityOutcome::Cancelled;
        }

        let mut notified = {
            let mut state = lock(&self.state);
            if state.recent.contains(transaction_id) {
                debug!("{} already observed, no wait needed", transaction_id);
                return MaturityOutcome::Matured;
            }

            let (notify, notified) = oneshot::channel();
            if let Some(previous) = state.waiter.replace(Waiter {
                transaction_id: *transaction_id,
                notify,
            }) {
                warn!(
                    "Maturity wait for {} replaced a pending wait for {}",
                    transaction_id, previous.transaction_id
                );
            }
            notified
        };

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => MaturityOutcome::Cancelled,
            Ok(()) = &mut notified => MaturityOutcome::Matured,
            _ = tokio::time::sleep_until(deadline) => MaturityOutcome::TimedOut,
        };

        if outcome != MaturityOutcome::Matured {
            let mut state = lock(&self.state);
            let ours = state
                .waiter
                .as_ref()
                .is_some_and(|waiter| waiter.transaction_id == *transaction_id);
            if ours {
                state.waiter = None;
            }
        }

        outcome
    }
}

impl Drop for MaturityGate {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
