//! KRC-20 commit/reveal inscriber for Kaspa
//!
//! Deploys, mints and transfers KRC-20 tokens by committing funds to a
//! script-hash address whose redeem script embeds the operation payload, then
//! revealing that script by spending the output.

pub mod cli;
pub mod config;
pub mod envelope;
pub mod errors;
pub mod ledger;
pub mod maturity;
pub mod operator;
pub mod orchestrator;
pub mod payload;
pub mod types;
pub mod utils;
