//! Envelope redeem scripts
//!
//! The redeem script locks the commit output to the signer's key and carries
//! the operation payload in a branch that never executes:
//!
//! ```text
//! <x-only pubkey> OP_CHECKSIG OP_FALSE OP_IF <"kasplex"> OP_0 <payload> OP_ENDIF
//! ```
//!
//! Spending the script-hash output requires pushing `<signature> <redeem script>`,
//! which is what publishes the payload. Every artifact here is a pure function
//! of (public key, payload, network).

pub mod address;

pub use address::ScriptHashAddress;

use bitcoin::key::XOnlyPublicKey;
use kaspa_txscript::opcodes::codes::{Op0, OpCheckSig, OpEndIf, OpFalse, OpIf};
use kaspa_txscript::pay_to_script_hash_signature_script;
use kaspa_txscript::script_builder::ScriptBuilder;
use tracing::debug;

use crate::errors::ScriptError;
use crate::payload::OperationPayload;
use crate::types::Network;

pub use kaspa_txscript::MAX_SCRIPT_ELEMENT_SIZE;

/// Protocol tag pushed ahead of the payload
pub const PROTOCOL_TAG: &[u8] = b"kasplex";

// <key push> + OP_CHECKSIG OP_FALSE OP_IF + <tag push> + OP_0 + OP_ENDIF
const FIXED_OVERHEAD: usize = 33 + 3 + 1 + PROTOCOL_TAG.len() + 1 + 1;

/// Redeem script plus the script-hash address it derives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeScript {
    redeem_script: Vec<u8>,
    address: ScriptHashAddress,
}

impl EnvelopeScript {
    /// Build the redeem script for `payload` locked to `public_key`
    ///
    /// The whole redeem script is pushed as one element when revealing, so it
    /// must fit the script element limit; an oversized payload is rejected here
    /// rather than at broadcast.
    pub fn derive(
        public_key: &XOnlyPublicKey,
        payload: &OperationPayload,
        network: Network,
    ) -> Result<Self, ScriptError> {
        let payload_bytes = payload.to_canonical_bytes()?;

        let script_len = FIXED_OVERHEAD + ScriptBuilder::canonical_data_size(&payload_bytes);
        if script_len > MAX_SCRIPT_ELEMENT_SIZE {
            let overhead = script_len - payload_bytes.len();
            return Err(ScriptError::PayloadTooLarge {
                size: payload_bytes.len(),
                limit: MAX_SCRIPT_ELEMENT_SIZE.saturating_sub(overhead),
            });
        }

        let redeem_script = ScriptBuilder::new()
            .add_data(&public_key.serialize())?
            .add_op(OpCheckSig)?
            .add_op(OpFalse)?
            .add_op(OpIf)?
            .add_data(PROTOCOL_TAG)?
            .add_op(Op0)?
            .add_data(&payload_bytes)?
            .add_op(OpEndIf)?
            .drain();

        let address = ScriptHashAddress::from_redeem_script(network, &redeem_script);

        debug!(
            "Constructed envelope script: {} ({} bytes)",
            hex::encode(&redeem_script),
            redeem_script.len()
        );
        debug!("Envelope P2SH address: {}", address);

        Ok(Self {
            redeem_script,
            address,
        })
    }

    pub fn redeem_script_bytes(&self) -> &[u8] {
        &self.redeem_script
    }

    pub fn address(&self) -> &ScriptHashAddress {
        &self.address
    }

    pub fn script_public_key(&self) -> Vec<u8> {
        self.address.script_public_key()
    }

    /// Signature script satisfying the redeem script: `<signature> <redeem script>`
    pub fn unlock_script(&self, signature: &[u8]) -> Result<Vec<u8>, ScriptError> {
        if signature.is_empty() {
            return Err(ScriptError::Encoding("empty signature".to_string()));
        }

        let signature_push = ScriptBuilder::new().add_data(signature)?.drain();
        Ok(pay_to_script_hash_signature_script(
            self.redeem_script.clone(),
            signature_push,
        )?)
    }
}
