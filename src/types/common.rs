//! Common types shared across all components
//!
//! Chain-level values: transaction identifiers, outpoints, spendable outputs as
//! reported by the ledger subsystem, and the address change notifications the
//! maturity gate correlates on.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::Network;
use crate::errors::AppError;

/// 32-byte transaction identifier, displayed as lowercase hex
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId([u8; 32]);

impl TransactionId {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionId({})", self)
    }
}

impl FromStr for TransactionId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| AppError::InvalidData(format!("transaction id must be 32 bytes: {}", s)))?;
        Ok(Self(bytes))
    }
}

impl Serialize for TransactionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TransactionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Reference to a specific output of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Outpoint {
    pub transaction_id: TransactionId,
    pub index: u32,
}

impl Outpoint {
    pub fn new(transaction_id: TransactionId, index: u32) -> Self {
        Self {
            transaction_id,
            index,
        }
    }
}

impl fmt::Display for Outpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.transaction_id, self.index)
    }
}

/// Spendable output as reported by the ledger's UTXO index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtxoEntry {
    pub outpoint: Outpoint,
    pub address: String,
    pub amount: u64, // Sompi
    pub script_public_key: Vec<u8>,
    pub block_daa_score: u64,
    pub is_coinbase: bool,
}

/// Address change notification delivered by the ledger subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub address: String,
    pub added: Vec<Outpoint>,
    pub removed: Vec<Outpoint>,
    /// Transaction the change is attributed to, when the ledger knows it
    pub transaction_id: Option<TransactionId>,
}

impl ChangeEvent {
    /// Every transaction id this event is evidence for: the associated id
    /// plus the creating transaction of each added outpoint
    pub fn transaction_ids(&self) -> impl Iterator<Item = &TransactionId> {
        self.transaction_id
            .iter()
            .chain(self.added.iter().map(|outpoint| &outpoint.transaction_id))
    }
}

/// Node readiness as reported by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerInfo {
    pub is_synced: bool,
    pub has_utxo_index: bool,
    pub network: Network,
}
