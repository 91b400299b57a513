use super::{Network, Outpoint, TransactionId, UtxoEntry};

/// Output paying a fixed amount to an address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOutput {
    pub address: String,
    pub amount: u64, // Sompi
}

/// What the external transaction builder is asked to produce
///
/// `priority_entries` are consumed first and always; `entries` are drawn on
/// only as far as needed to cover outputs and fees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub priority_entries: Vec<UtxoEntry>,
    pub entries: Vec<UtxoEntry>,
    pub outputs: Vec<PaymentOutput>,
    pub change_address: String,
    pub priority_fee: u64, // Sompi
    pub network: Network,
}

/// Input of a built transaction together with the entry it spends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingInput {
    pub utxo: UtxoEntry,
    /// Empty until signed or filled
    pub signature_script: Vec<u8>,
}

impl PendingInput {
    pub fn unsigned(utxo: UtxoEntry) -> Self {
        Self {
            utxo,
            signature_script: Vec::new(),
        }
    }

    pub fn outpoint(&self) -> &Outpoint {
        &self.utxo.outpoint
    }

    pub fn is_signed(&self) -> bool {
        !self.signature_script.is_empty()
    }
}

/// Transaction returned by the builder, ready for signing and submission
///
/// Kaspa transaction ids do not commit to signature scripts, so the id is
/// known before signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub id: TransactionId,
    pub inputs: Vec<PendingInput>,
    pub outputs: Vec<PaymentOutput>,
    pub fee: u64, // Sompi
}

impl PendingTransaction {
    /// Position of the input spending `outpoint`
    pub fn input_index(&self, outpoint: &Outpoint) -> Option<usize> {
        self.inputs
            .iter()
            .position(|input| input.outpoint() == outpoint)
    }

    pub fn is_fully_signed(&self) -> bool {
        self.inputs.iter().all(PendingInput::is_signed)
    }
}
