//! Operation façade
//!
//! Entry points for deploy, mint and transfer. Each call validates its
//! parameters, then drives exactly one [`OrchestratorRun`]. Invalid parameters
//! come back as a failed [`RunReport`] without any ledger interaction.
//!
//! Runs for the same signer address are serialised: both would spend the same
//! outputs, so a second call waits until the first reaches a terminal state.
//! Runs for different signers proceed independently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{info, warn};

use crate::errors::ValidationError;
use crate::ledger::{Ledger, Signer};
use crate::maturity::CancelHandle;
use crate::orchestrator::{FailureReason, OrchestratorRun, RunReport, RunSettings};
use crate::payload::{self, OperationKind, OperationParams};

/// Per-call overrides of the operator's run settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationOptions {
    /// Commit priority fee in sompi
    pub priority_fee: Option<u64>,
    /// Bound on each maturity wait
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MintRequest {
    pub ticker: String,
    pub options: OperationOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployRequest {
    pub ticker: String,
    pub max_supply: Option<String>,
    pub mint_limit: Option<String>,
    pub decimals: Option<String>,
    pub preallocation: Option<String>,
    pub options: OperationOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferRequest {
    pub ticker: String,
    pub amount: Option<String>,
    pub destination: Option<String>,
    pub options: OperationOptions,
}

/// Drives KRC-20 operations against one ledger
pub struct Krc20Operator {
    ledger: Arc<dyn Ledger>,
    settings: RunSettings,
    signer_locks: SignerLocks,
}

impl Krc20Operator {
    pub fn new(ledger: Arc<dyn Ledger>, settings: RunSettings) -> Self {
        Self {
            ledger,
            settings,
            signer_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub async fn mint(&self, signer: Arc<dyn Signer>, request: MintRequest) -> RunReport {
        let params = OperationParams::for_ticker(request.ticker);
        self.execute(signer, OperationKind::Mint, &params, request.options, None)
            .await
    }

    pub async fn deploy(&self, signer: Arc<dyn Signer>, request: DeployRequest) -> RunReport {
        let params = OperationParams {
            ticker: request.ticker,
            max_supply: request.max_supply,
            mint_limit: request.mint_limit,
            decimals: request.decimals,
            preallocation: request.preallocation,
            ..OperationParams::default()
        };
        self.execute(signer, OperationKind::Deploy, &params, request.options, None)
            .await
    }

    pub async fn transfer(&self, signer: Arc<dyn Signer>, request: TransferRequest) -> RunReport {
        let params = OperationParams {
            ticker: request.ticker,
            amount: request.amount,
            destination: request.destination,
            ..OperationParams::default()
        };
        self.execute(signer, OperationKind::Transfer, &params, request.options, None)
            .await
    }

    /// Run `count` mints back to back, stopping at the first one not accepted
    pub async fn mint_repeatedly(
        &self,
        signer: Arc<dyn Signer>,
        request: MintRequest,
        count: usize,
    ) -> Vec<RunReport> {
        let mut reports = Vec::with_capacity(count);

        for round in 1..=count {
            info!("Mint {}/{} of {}", round, count, request.ticker);
            let report = self.mint(Arc::clone(&signer), request.clone()).await;
            let accepted = report.is_accepted();
            reports.push(report);

            if !accepted {
                warn!("Stopping repeated mint after round {}", round);
                break;
            }
        }

        reports
    }

    /// Validate, then drive one run for `kind`
    ///
    /// When `cancel` is given, cancelling it ends the run at its next maturity
    /// wait with the corresponding timeout reason. A handle already cancelled
    /// when the run starts ends it before anything is broadcast.
    pub async fn execute(
        &self,
        signer: Arc<dyn Signer>,
        kind: OperationKind,
        params: &OperationParams,
        options: OperationOptions,
        cancel: Option<CancelHandle>,
    ) -> RunReport {
        let settings = self.settings_for(options);

        let payload = match payload::build(kind, params) {
            Ok(payload) => payload,
            Err(err) => return self.rejected(kind, params, &settings, err),
        };

        let lease = self.lease_signer(signer.address());
        let _guard = lease.lock.lock().await;

        let mut run = OrchestratorRun::new(Arc::clone(&self.ledger), signer, payload, settings);
        if let Some(cancel) = cancel {
            run = run.with_cancel_handle(cancel);
        }

        run.execute().await
    }

    fn settings_for(&self, options: OperationOptions) -> RunSettings {
        let mut settings = self.settings.clone();
        if let Some(fee) = options.priority_fee {
            settings.priority_fee = fee;
        }
        if let Some(timeout) = options.timeout {
            settings.phase_timeout = timeout;
        }
        settings
    }

    fn rejected(
        &self,
        kind: OperationKind,
        params: &OperationParams,
        settings: &RunSettings,
        err: ValidationError,
    ) -> RunReport {
        warn!("Rejected {} of {}: {}", kind, params.ticker, err);
        RunReport::rejected(kind, &params.ticker, settings.network, FailureReason::from(err))
    }

    /// Number of signers with a run queued or in flight
    pub fn tracked_signers(&self) -> usize {
        lock_map(&self.signer_locks).len()
    }

    fn lease_signer(&self, address: &str) -> SignerLease<'_> {
        let lock = Arc::clone(lock_map(&self.signer_locks).entry(address.to_string()).or_default());
        SignerLease {
            locks: &self.signer_locks,
            address: address.to_string(),
            lock,
        }
    }
}

type SignerLocks = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

fn lock_map(locks: &SignerLocks) -> MutexGuard<'_, HashMap<String, Arc<tokio::sync::Mutex<()>>>> {
    locks.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A signer's run lock, dropped from the map once no run holds or awaits it
struct SignerLease<'a> {
    locks: &'a SignerLocks,
    address: String,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl Drop for SignerLease<'_> {
    fn drop(&mut self) {
        let mut locks = lock_map(self.locks);
        // Only the map and this lease still refer to the lock
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.address);
        }
    }
}
