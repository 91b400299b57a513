use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tokio::time::Instant;

use crate::errors::{ScriptError, ValidationError};
use crate::payload::OperationKind;
use crate::types::{Network, TransactionId};

/// Why a run ended without acceptance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    ValidationError(String),
    PayloadTooLarge { size: usize, limit: usize },
    NodeNotReady(String),
    SubscriptionFailed(String),
    BroadcastError(String),
    CommitTimeout,
    RevealSubmitFailed(String),
    RevealTimeout,
    RevealNotAccepted,
}

impl FailureReason {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            FailureReason::ValidationError(_) => "validation_error",
            FailureReason::PayloadTooLarge { .. } => "payload_too_large",
            FailureReason::NodeNotReady(_) => "node_not_ready",
            FailureReason::SubscriptionFailed(_) => "subscription_failed",
            FailureReason::BroadcastError(_) => "broadcast_error",
            FailureReason::CommitTimeout => "commit_timeout",
            FailureReason::RevealSubmitFailed(_) => "reveal_submit_failed",
            FailureReason::RevealTimeout => "reveal_timeout",
            FailureReason::RevealNotAccepted => "reveal_not_accepted",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, FailureReason::CommitTimeout | FailureReason::RevealTimeout)
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::ValidationError(detail) => write!(f, "validation failed: {}", detail),
            FailureReason::PayloadTooLarge { size, limit } => {
                write!(f, "payload of {} bytes exceeds the {}-byte limit", size, limit)
            }
            FailureReason::NodeNotReady(detail) => write!(f, "node not ready: {}", detail),
            FailureReason::SubscriptionFailed(detail) => write!(f, "subscription failed: {}", detail),
            FailureReason::BroadcastError(detail) => write!(f, "commit broadcast failed: {}", detail),
            FailureReason::CommitTimeout => f.write_str("commit did not mature in time"),
            FailureReason::RevealSubmitFailed(detail) => write!(f, "reveal submission failed: {}", detail),
            FailureReason::RevealTimeout => f.write_str("reveal did not mature in time"),
            FailureReason::RevealNotAccepted => f.write_str("reveal not found among signer outputs"),
        }
    }
}

impl From<ValidationError> for FailureReason {
    fn from(err: ValidationError) -> Self {
        FailureReason::ValidationError(err.to_string())
    }
}

impl From<ScriptError> for FailureReason {
    fn from(err: ScriptError) -> Self {
        match err {
            ScriptError::PayloadTooLarge { size, limit } => FailureReason::PayloadTooLarge { size, limit },
            ScriptError::Encoding(detail) => FailureReason::ValidationError(detail),
        }
    }
}

/// Terminal result of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Accepted,
    Failed(FailureReason),
}

/// Caller-facing summary of a run outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Accepted,
    Failed,
    TimedOut,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunStatus::Accepted => "accepted",
            RunStatus::Failed => "failed",
            RunStatus::TimedOut => "timed out",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Commit,
    Reveal,
}

/// Record of one on-chain step of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionPhase {
    pub phase: Phase,
    /// Set once the transaction was broadcast
    pub transaction_id: Option<TransactionId>,
    pub matured: bool,
    #[serde(skip)]
    pub deadline: Option<Instant>,
}

impl TransactionPhase {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            transaction_id: None,
            matured: false,
            deadline: None,
        }
    }
}

/// Everything a caller learns about a finished run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub operation: OperationKind,
    pub ticker: String,
    pub network: Network,
    pub outcome: RunOutcome,
    pub commit_tx_id: Option<TransactionId>,
    pub reveal_tx_id: Option<TransactionId>,
    pub script_address: Option<String>,
    pub phases: Vec<TransactionPhase>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Report for a run rejected before any ledger interaction
    pub fn rejected(operation: OperationKind, ticker: &str, network: Network, reason: FailureReason) -> Self {
        let now = Utc::now();
        Self {
            operation,
            ticker: ticker.to_string(),
            network,
            outcome: RunOutcome::Failed(reason),
            commit_tx_id: None,
            reveal_tx_id: None,
            script_address: None,
            phases: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    pub fn status(&self) -> RunStatus {
        match &self.outcome {
            RunOutcome::Accepted => RunStatus::Accepted,
            RunOutcome::Failed(reason) if reason.is_timeout() => RunStatus::TimedOut,
            RunOutcome::Failed(_) => RunStatus::Failed,
        }
    }

    pub fn reason(&self) -> Option<&FailureReason> {
        match &self.outcome {
            RunOutcome::Accepted => None,
            RunOutcome::Failed(reason) => Some(reason),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.outcome == RunOutcome::Accepted
    }

    pub fn phase(&self, phase: Phase) -> Option<&TransactionPhase> {
        self.phases.iter().find(|record| record.phase == phase)
    }
}
