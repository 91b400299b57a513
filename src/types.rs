//! KRC-20 Inscriber - Type System
//!
//! - `common`: Chain-level values shared by every component (TransactionId, Outpoint, UtxoEntry, ChangeEvent)
//! - `network`: Kaspa network identifiers and their address prefixes
//! - `transaction`: Requests handed to, and transactions returned by, the external transaction builder

mod common;
mod network;
mod transaction;

pub use common::*;
pub use network::Network;
pub use transaction::*;
