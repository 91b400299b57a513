//! Commit-reveal orchestrator
//!
//! Drives one KRC-20 operation through its two on-chain steps:
//!
//! 1. **Commit** - pay the operation's funding amount to the envelope's
//!    script-hash address and wait for the ledger to report it.
//! 2. **Reveal** - spend that output with `<signature> <redeem script>`, which
//!    publishes the payload, wait for it, then confirm the reveal's change is
//!    spendable by the signer.
//!
//! A run is a single pass through an explicit state machine. The only
//! suspension points are the two maturity waits; every failure is terminal
//! and nothing is retried. A new run always starts from `Idle`.

mod outcome;

pub use outcome::{FailureReason, Phase, RunOutcome, RunReport, RunStatus, TransactionPhase};

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::envelope::EnvelopeScript;
use crate::errors::{AppResult, LedgerError};
use crate::ledger::{Ledger, Signer};
use crate::maturity::{CancelHandle, CancelToken, MaturityGate, MaturityOutcome, DEFAULT_RECENT_CAPACITY};
use crate::payload::{commit_funding, OperationPayload};
use crate::types::{Network, PaymentOutput, PendingTransaction, TransactionId, TransactionRequest, UtxoEntry};
use crate::utils::currency::format_sompi_as_kas;

/// Default priority fee for commit and reveal (0.1 KAS)
pub const DEFAULT_PRIORITY_FEE_SOMPI: u64 = 10_000_000;

/// Default bound on each maturity wait
pub const DEFAULT_PHASE_TIMEOUT: Duration = Duration::from_millis(20_000);

/// Per-run knobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub network: Network,
    pub priority_fee: u64,        // Sompi, commit
    pub reveal_priority_fee: u64, // Sompi
    pub phase_timeout: Duration,
    pub recent_match_capacity: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            network: Network::default(),
            priority_fee: DEFAULT_PRIORITY_FEE_SOMPI,
            reveal_priority_fee: DEFAULT_PRIORITY_FEE_SOMPI,
            phase_timeout: DEFAULT_PHASE_TIMEOUT,
            recent_match_capacity: DEFAULT_RECENT_CAPACITY,
        }
    }
}

/// Envelope plus the gate watching its addresses, live from commit to reveal maturity
struct Armed {
    envelope: EnvelopeScript,
    gate: MaturityGate,
}

enum RunState {
    Idle,
    CommitPending {
        armed: Armed,
    },
    AwaitingCommitMaturity {
        armed: Armed,
        commit: TransactionId,
    },
    RevealPending {
        armed: Armed,
        commit: TransactionId,
    },
    AwaitingRevealMaturity {
        armed: Armed,
        reveal: TransactionId,
    },
    VerifyingAcceptance {
        reveal: TransactionId,
    },
    Accepted,
    Failed(FailureReason),
}

impl RunState {
    fn name(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::CommitPending { .. } => "commit pending",
            RunState::AwaitingCommitMaturity { .. } => "awaiting commit maturity",
            RunState::RevealPending { .. } => "reveal pending",
            RunState::AwaitingRevealMaturity { .. } => "awaiting reveal maturity",
            RunState::VerifyingAcceptance { .. } => "verifying acceptance",
            RunState::Accepted => "accepted",
            RunState::Failed(_) => "failed",
        }
    }
}

/// One commit-reveal attempt for one payload and one signer
pub struct OrchestratorRun {
    ledger: Arc<dyn Ledger>,
    signer: Arc<dyn Signer>,
    payload: OperationPayload,
    settings: RunSettings,
    cancel: CancelHandle,
    phases: Vec<TransactionPhase>,
    script_address: Option<String>,
}

impl OrchestratorRun {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        signer: Arc<dyn Signer>,
        payload: OperationPayload,
        settings: RunSettings,
    ) -> Self {
        Self {
            ledger,
            signer,
            payload,
            settings,
            cancel: CancelHandle::new(),
            phases: Vec::new(),
            script_address: None,
        }
    }

    /// Use an externally owned cancel handle instead of the run's own
    pub fn with_cancel_handle(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    /// Handle that aborts the run before its commit broadcast or at its next
    /// maturity wait
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Run to a terminal state
    pub async fn execute(mut self) -> RunReport {
        let started_at = Utc::now();
        let mut token = self.cancel.token();

        info!(
            "Starting {} of {} on {} for {}",
            self.payload.kind(),
            self.payload.ticker(),
            self.settings.network,
            self.signer.address()
        );

        let mut state = RunState::Idle;
        let outcome = loop {
            debug!("Run state: {}", state.name());

            let next = match state {
                RunState::Idle | RunState::CommitPending { .. } if token.is_cancelled() => {
                    Err(self.cancelled_before_commit())
                }
                RunState::Idle => self.prepare().await,
                RunState::CommitPending { armed } => self.submit_commit(armed).await,
                RunState::AwaitingCommitMaturity { armed, commit } => {
                    self.await_commit(armed, commit, &mut token).await
                }
                RunState::RevealPending { armed, commit } => self.submit_reveal(armed, commit).await,
                RunState::AwaitingRevealMaturity { armed, reveal } => {
                    self.await_reveal(armed, reveal, &mut token).await
                }
                RunState::VerifyingAcceptance { reveal } => self.verify_acceptance(reveal).await,
                RunState::Accepted => break RunOutcome::Accepted,
                RunState::Failed(reason) => break RunOutcome::Failed(reason),
            };

            state = next.unwrap_or_else(|reason| {
                warn!("{} of {} failed: {}", self.payload.kind(), self.payload.ticker(), reason);
                RunState::Failed(reason)
            });
        };

        match &outcome {
            RunOutcome::Accepted => info!(
                "{} of {} accepted",
                self.payload.kind(),
                self.payload.ticker()
            ),
            RunOutcome::Failed(reason) => info!(
                "{} of {} ended with {}",
                self.payload.kind(),
                self.payload.ticker(),
                reason.code()
            ),
        }

        let transaction_id = |phase: Phase| {
            self.phases
                .iter()
                .find(|record| record.phase == phase)
                .and_then(|record| record.transaction_id)
        };

        RunReport {
            operation: self.payload.kind(),
            ticker: self.payload.ticker().to_string(),
            network: self.settings.network,
            outcome,
            commit_tx_id: transaction_id(Phase::Commit),
            reveal_tx_id: transaction_id(Phase::Reveal),
            script_address: self.script_address.clone(),
            phases: self.phases.clone(),
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Derive the envelope, check the node, and start watching both addresses
    async fn prepare(&mut self) -> Result<RunState, FailureReason> {
        let envelope = EnvelopeScript::derive(&self.signer.public_key(), &self.payload, self.settings.network)?;
        let script_address = envelope.address().encode();
        self.script_address = Some(script_address.clone());

        self.check_node().await?;

        let addresses = vec![self.signer.address().to_string(), script_address];
        let stream = self
            .ledger
            .subscribe_address_changes(&addresses)
            .await
            .map_err(|e| FailureReason::SubscriptionFailed(e.to_string()))?;
        let gate = MaturityGate::spawn(stream, self.settings.recent_match_capacity);

        debug!("Watching {} for maturity evidence", addresses.join(", "));

        Ok(RunState::CommitPending {
            armed: Armed { envelope, gate },
        })
    }

    /// Nothing is broadcast yet, so cancellation ends the commit phase
    fn cancelled_before_commit(&self) -> FailureReason {
        warn!("Run cancelled before the commit was broadcast");
        FailureReason::CommitTimeout
    }

    async fn check_node(&self) -> Result<(), FailureReason> {
        let info = self
            .ledger
            .server_info()
            .await
            .map_err(|e| FailureReason::NodeNotReady(e.to_string()))?;

        if !info.is_synced {
            return Err(FailureReason::NodeNotReady("node is not synced".to_string()));
        }
        if !info.has_utxo_index {
            return Err(FailureReason::NodeNotReady("node has no UTXO index".to_string()));
        }
        if info.network != self.settings.network {
            return Err(FailureReason::NodeNotReady(format!(
                "node is on {}, run targets {}",
                info.network, self.settings.network
            )));
        }

        Ok(())
    }

    async fn submit_commit(&mut self, armed: Armed) -> Result<RunState, FailureReason> {
        self.phases.push(TransactionPhase::new(Phase::Commit));

        let commit = self
            .broadcast_commit(&armed.envelope)
            .await
            .map_err(|e| FailureReason::BroadcastError(e.to_string()))?;

        self.record_submission(Phase::Commit, commit);
        info!("Commit {} submitted", commit);

        Ok(RunState::AwaitingCommitMaturity { armed, commit })
    }

    async fn broadcast_commit(&self, envelope: &EnvelopeScript) -> AppResult<TransactionId> {
        let funding = commit_funding(self.payload.kind());
        let entries = self.ledger.get_spendable_outputs(self.signer.address()).await?;

        debug!(
            "Funding commit with {} to {} from {} entries",
            format_sompi_as_kas(funding),
            envelope.address(),
            entries.len()
        );

        let request = TransactionRequest {
            priority_entries: Vec::new(),
            entries,
            outputs: vec![PaymentOutput {
                address: envelope.address().encode(),
                amount: funding,
            }],
            change_address: self.signer.address().to_string(),
            priority_fee: self.settings.priority_fee,
            network: self.settings.network,
        };

        let mut last = None;
        for transaction in self.ledger.create_transactions(&request).await? {
            let signed = self.signer.sign_standard_inputs(transaction).await?;
            let id = self.ledger.submit(&signed).await?;
            debug!("Submitted commit-side transaction {} (fee {})", id, signed.fee);
            last = Some(id);
        }

        last.ok_or_else(|| LedgerError::Build("builder returned no commit transaction".to_string()).into())
    }

    async fn await_commit(
        &mut self,
        armed: Armed,
        commit: TransactionId,
        token: &mut CancelToken,
    ) -> Result<RunState, FailureReason> {
        match self.await_phase(&armed.gate, Phase::Commit, commit, token).await {
            MaturityOutcome::Matured => Ok(RunState::RevealPending { armed, commit }),
            MaturityOutcome::TimedOut | MaturityOutcome::Cancelled => Err(FailureReason::CommitTimeout),
        }
    }

    async fn submit_reveal(&mut self, armed: Armed, commit: TransactionId) -> Result<RunState, FailureReason> {
        self.phases.push(TransactionPhase::new(Phase::Reveal));

        let reveal = self
            .broadcast_reveal(&armed.envelope, commit)
            .await
            .map_err(|e| FailureReason::RevealSubmitFailed(e.to_string()))?;

        self.record_submission(Phase::Reveal, reveal);
        info!("Reveal {} submitted", reveal);

        Ok(RunState::AwaitingRevealMaturity { armed, reveal })
    }

    async fn broadcast_reveal(&self, envelope: &EnvelopeScript, commit: TransactionId) -> AppResult<TransactionId> {
        let script_utxo = self.find_commit_output(envelope, commit).await?;
        let entries = self.ledger.get_spendable_outputs(self.signer.address()).await?;

        let request = TransactionRequest {
            priority_entries: vec![script_utxo.clone()],
            entries,
            outputs: Vec::new(),
            change_address: self.signer.address().to_string(),
            priority_fee: self.settings.reveal_priority_fee,
            network: self.settings.network,
        };

        let mut reveal = None;
        for transaction in self.ledger.create_transactions(&request).await? {
            let mut signed = self.signer.sign_standard_inputs(transaction).await?;

            let script_input = signed.input_index(&script_utxo.outpoint);
            if let Some(index) = script_input {
                signed.inputs[index].signature_script = self.unlock(envelope, &signed, index).await?;
            }

            let id = self.ledger.submit(&signed).await?;
            debug!("Submitted reveal-side transaction {} (fee {})", id, signed.fee);

            if script_input.is_some() {
                reveal = Some(id);
            }
        }

        reveal.ok_or_else(|| {
            LedgerError::Build(format!("no built transaction spends {}", script_utxo.outpoint)).into()
        })
    }

    /// The script-hash output created by `commit`
    async fn find_commit_output(&self, envelope: &EnvelopeScript, commit: TransactionId) -> AppResult<UtxoEntry> {
        let script_address = envelope.address().encode();
        let entries = self.ledger.get_spendable_outputs(&script_address).await?;

        entries
            .into_iter()
            .find(|entry| entry.outpoint.transaction_id == commit)
            .ok_or_else(|| {
                LedgerError::Query {
                    method: "get_spendable_outputs".to_string(),
                    message: format!("no output of commit {} at {}", commit, script_address),
                }
                .into()
            })
    }

    async fn unlock(&self, envelope: &EnvelopeScript, transaction: &PendingTransaction, index: usize) -> AppResult<Vec<u8>> {
        let signature = self.signer.sign_single_input(transaction, index).await?;
        Ok(envelope.unlock_script(&signature)?)
    }

    async fn await_reveal(
        &mut self,
        armed: Armed,
        reveal: TransactionId,
        token: &mut CancelToken,
    ) -> Result<RunState, FailureReason> {
        match self.await_phase(&armed.gate, Phase::Reveal, reveal, token).await {
            MaturityOutcome::Matured => Ok(RunState::VerifyingAcceptance { reveal }),
            MaturityOutcome::TimedOut | MaturityOutcome::Cancelled => Err(FailureReason::RevealTimeout),
        }
    }

    async fn await_phase(
        &mut self,
        gate: &MaturityGate,
        phase: Phase,
        transaction_id: TransactionId,
        token: &mut CancelToken,
    ) -> MaturityOutcome {
        let timeout = self.settings.phase_timeout;
        if let Some(record) = self.record_mut(phase) {
            record.deadline = Some(Instant::now() + timeout);
        }

        info!("Waiting up to {:?} for {:?} {} to mature", timeout, phase, transaction_id);
        let outcome = gate.await_maturity(&transaction_id, timeout, token).await;

        match outcome {
            MaturityOutcome::Matured => {
                if let Some(record) = self.record_mut(phase) {
                    record.matured = true;
                }
                info!("{:?} {} matured", phase, transaction_id);
            }
            MaturityOutcome::TimedOut => warn!("{:?} {} not seen within {:?}", phase, transaction_id, timeout),
            MaturityOutcome::Cancelled => warn!("Run cancelled while awaiting {:?} {}", phase, transaction_id),
        }

        outcome
    }

    /// Re-query the signer's outputs for the reveal's change
    async fn verify_acceptance(&self, reveal: TransactionId) -> Result<RunState, FailureReason> {
        let entries = self
            .ledger
            .get_spendable_outputs(self.signer.address())
            .await
            .map_err(|e| {
                warn!("Acceptance check for {} failed: {}", reveal, e);
                FailureReason::RevealNotAccepted
            })?;

        if entries.iter().any(|entry| entry.outpoint.transaction_id == reveal) {
            Ok(RunState::Accepted)
        } else {
            Err(FailureReason::RevealNotAccepted)
        }
    }

    fn record_submission(&mut self, phase: Phase, transaction_id: TransactionId) {
        if let Some(record) = self.record_mut(phase) {
            record.transaction_id = Some(transaction_id);
        }
    }

    fn record_mut(&mut self, phase: Phase) -> Option<&mut TransactionPhase> {
        self.phases.iter_mut().find(|record| record.phase == phase)
    }
}
