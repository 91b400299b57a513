//! External ledger and signing interfaces
//!
//! The orchestrator never talks to a node or touches private keys directly.
//! Everything chain-facing goes through these two traits:
//!
//! - **Ledger** - UTXO index queries, transaction construction and fee
//!   calculation, broadcast, and address change subscriptions
//! - **Signer** - the signing identity: its x-only public key, its address, and
//!   signatures over standard inputs or one specific input
//!
//! Implementations wrap a node RPC client and a key store; the test suite wraps
//! an in-memory chain.

use async_trait::async_trait;
use bitcoin::key::XOnlyPublicKey;
use futures::stream::BoxStream;

use crate::errors::LedgerResult;
use crate::types::{ChangeEvent, PendingTransaction, ServerInfo, TransactionId, TransactionRequest, UtxoEntry};

/// Push-style stream of address change notifications
pub type ChangeStream = BoxStream<'static, ChangeEvent>;

/// Ledger RPC/UTXO subsystem
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Node sync state and index availability
    async fn server_info(&self) -> LedgerResult<ServerInfo>;

    /// Spendable outputs currently indexed for `address`
    async fn get_spendable_outputs(&self, address: &str) -> LedgerResult<Vec<UtxoEntry>>;

    /// Build unsigned transactions satisfying `request`
    ///
    /// May return several transactions when inputs must be compounded first;
    /// they are submitted in order and the last one carries the requested
    /// outputs.
    async fn create_transactions(&self, request: &TransactionRequest) -> LedgerResult<Vec<PendingTransaction>>;

    /// Broadcast a fully signed transaction
    async fn submit(&self, transaction: &PendingTransaction) -> LedgerResult<TransactionId>;

    /// Subscribe to UTXO changes for `addresses`
    async fn subscribe_address_changes(&self, addresses: &[String]) -> LedgerResult<ChangeStream>;
}

/// Signing identity for one operator key
#[async_trait]
pub trait Signer: Send + Sync {
    fn public_key(&self) -> XOnlyPublicKey;

    /// Address holding the signer's funds and receiving change
    fn address(&self) -> &str;

    /// Sign every input spending one of the signer's own outputs
    ///
    /// Inputs locked by other scripts are left with an empty signature script.
    async fn sign_standard_inputs(&self, transaction: PendingTransaction) -> LedgerResult<PendingTransaction>;

    /// Signature over input `input_index` alone, for script-hash spends
    async fn sign_single_input(&self, transaction: &PendingTransaction, input_index: usize) -> LedgerResult<Vec<u8>>;
}
