//! Kaspa script-hash addresses
//!
//! A P2SH address commits to `blake2b-256(redeem_script)`. The locking script
//! is `OP_BLAKE2B OP_DATA_32 <hash> OP_EQUAL`; the address string carries the
//! network prefix, version 8 and the same hash.

use kaspa_addresses::{Address, Version};
use kaspa_consensus_core::tx::ScriptPublicKey;
use kaspa_txscript::pay_to_script_hash_script;
use std::fmt;

use crate::types::Network;

/// Script-hash address derived from a redeem script
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptHashAddress {
    network: Network,
    address: Address,
    script_public_key: ScriptPublicKey,
}

impl ScriptHashAddress {
    pub fn from_redeem_script(network: Network, redeem_script: &[u8]) -> Self {
        let script_public_key = pay_to_script_hash_script(redeem_script);
        // OP_BLAKE2B OP_DATA_32 <hash> OP_EQUAL
        let address = Address::new(
            network.prefix(),
            Version::ScriptHash,
            &script_public_key.script()[2..34],
        );

        Self {
            network,
            address,
            script_public_key,
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn script_hash(&self) -> &[u8] {
        &self.address.payload
    }

    pub fn as_address(&self) -> &Address {
        &self.address
    }

    /// Locking script paying to this address
    pub fn script_public_key(&self) -> Vec<u8> {
        self.script_public_key.script().to_vec()
    }

    pub fn script_public_key_version(&self) -> u16 {
        self.script_public_key.version()
    }

    /// Human-readable address string
    pub fn encode(&self) -> String {
        String::from(&self.address)
    }
}

impl fmt::Display for ScriptHashAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
