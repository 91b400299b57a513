use bitcoin::key::XOnlyPublicKey;
use clap::Args;
use std::str::FromStr;
use tracing::info;

use super::OperationArgs;
use crate::config::AppConfig;
use crate::envelope::EnvelopeScript;
use crate::errors::{AppError, AppResult};
use crate::payload::{self, commit_funding};
use crate::utils::currency::format_sompi_as_kas;

/// Derive the envelope script and script-hash address for an operation
#[derive(Args)]
pub struct EnvelopeCommand {
    #[command(flatten)]
    pub operation: OperationArgs,

    /// Signer's 32-byte x-only public key (hex)
    #[arg(long)]
    pub public_key: String,
}

impl EnvelopeCommand {
    pub fn run(&self) -> AppResult<()> {
        let config = AppConfig::load()
            .map_err(|e| AppError::Config(format!("Failed to load configuration: {}", e)))?;
        let network = self.operation.network(config.network()?)?;

        let public_key = XOnlyPublicKey::from_str(&self.public_key)
            .map_err(|e| AppError::InvalidData(format!("Invalid x-only public key: {}", e)))?;

        let kind = self.operation.kind()?;
        let payload = payload::build(kind, &self.operation.params())?;
        let envelope = EnvelopeScript::derive(&public_key, &payload, network)?;

        info!("Derived {} envelope for {} on {}", kind, payload.ticker(), network);

        println!("\n=== Envelope ===");
        println!("Network:           {}", network);
        println!("Operation:         {} {}", kind, payload.ticker());
        println!("Redeem script:     {}", hex::encode(envelope.redeem_script_bytes()));
        println!("Script public key: {}", hex::encode(envelope.script_public_key()));
        println!("P2SH address:      {}", envelope.address());
        println!("Commit funding:    {}", format_sompi_as_kas(commit_funding(kind)));

        Ok(())
    }
}
