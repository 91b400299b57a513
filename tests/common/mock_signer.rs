//! Deterministic Test Signer
//!
//! Produces fixed-shape signatures so tests can check where they end up
//! without any real key material.

use async_trait::async_trait;
use bitcoin::key::XOnlyPublicKey;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use krc20_inscribe::errors::{LedgerError, LedgerResult};
use krc20_inscribe::ledger::Signer;
use krc20_inscribe::types::PendingTransaction;

/// secp256k1 generator point, x-only
pub const TEST_PUBLIC_KEY: &str = "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

/// Schnorr-sized signature plus SIGHASH_ALL
pub const SCRIPT_SIGNATURE_LEN: usize = 65;

pub struct MockSigner {
    public_key: XOnlyPublicKey,
    address: String,
    pub single_input_signatures: AtomicUsize,
}

impl MockSigner {
    pub fn new(address: &str) -> Self {
        Self {
            public_key: XOnlyPublicKey::from_str(TEST_PUBLIC_KEY).unwrap(),
            address: address.to_string(),
            single_input_signatures: AtomicUsize::new(0),
        }
    }

    pub fn script_signature() -> Vec<u8> {
        let mut signature = vec![0x5a; SCRIPT_SIGNATURE_LEN - 1];
        signature.push(0x01);
        signature
    }
}

#[async_trait]
impl Signer for MockSigner {
    fn public_key(&self) -> XOnlyPublicKey {
        self.public_key
    }

    fn address(&self) -> &str {
        &self.address
    }

    async fn sign_standard_inputs(&self, mut transaction: PendingTransaction) -> LedgerResult<PendingTransaction> {
        for input in transaction.inputs.iter_mut() {
            if input.utxo.address == self.address {
                let mut script = vec![0x41];
                script.extend(std::iter::repeat(0x11).take(0x41));
                input.signature_script = script;
            }
        }
        Ok(transaction)
    }

    async fn sign_single_input(&self, transaction: &PendingTransaction, input_index: usize) -> LedgerResult<Vec<u8>> {
        if input_index >= transaction.inputs.len() {
            return Err(LedgerError::Signing(format!(
                "input {} out of range for {}",
                input_index, transaction.id
            )));
        }
        self.single_input_signatures.fetch_add(1, Ordering::SeqCst);
        Ok(Self::script_signature())
    }
}
