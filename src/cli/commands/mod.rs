pub mod config;
pub mod envelope;
pub mod payload;

use clap::Args;

use crate::errors::AppResult;
use crate::payload::{OperationKind, OperationParams};
use crate::types::Network;

/// Operation description shared by the offline commands
#[derive(Args, Debug, Clone)]
pub struct OperationArgs {
    /// Operation: deploy, mint or transfer
    #[arg(long, default_value = "mint")]
    pub operation: String,

    /// Token ticker
    #[arg(long)]
    pub ticker: String,

    /// Maximum supply (deploy)
    #[arg(long)]
    pub max: Option<String>,

    /// Mint limit per mint (deploy)
    #[arg(long)]
    pub lim: Option<String>,

    /// Decimals (deploy)
    #[arg(long)]
    pub dec: Option<String>,

    /// Preallocation (deploy)
    #[arg(long)]
    pub pre: Option<String>,

    /// Amount to transfer (transfer)
    #[arg(long)]
    pub amount: Option<String>,

    /// Recipient address (transfer)
    #[arg(long)]
    pub destination: Option<String>,

    /// Network id (overrides krc20.toml)
    #[arg(long)]
    pub network: Option<String>,
}

impl OperationArgs {
    pub fn kind(&self) -> AppResult<OperationKind> {
        Ok(self.operation.parse()?)
    }

    pub fn params(&self) -> OperationParams {
        OperationParams {
            ticker: self.ticker.clone(),
            max_supply: self.max.clone(),
            mint_limit: self.lim.clone(),
            decimals: self.dec.clone(),
            preallocation: self.pre.clone(),
            amount: self.amount.clone(),
            destination: self.destination.clone(),
        }
    }

    /// `--network` if given, else the configured network
    pub fn network(&self, configured: Network) -> AppResult<Network> {
        match &self.network {
            Some(id) => id.parse(),
            None => Ok(configured),
        }
    }
}
