use clap::Args;
use tracing::info;

use super::OperationArgs;
use crate::errors::AppResult;
use crate::payload;

/// Build and print the canonical operation payload
#[derive(Args)]
pub struct PayloadCommand {
    #[command(flatten)]
    pub operation: OperationArgs,

    /// Also print the payload bytes as hex
    #[arg(long)]
    pub hex: bool,
}

impl PayloadCommand {
    pub fn run(&self) -> AppResult<()> {
        let kind = self.operation.kind()?;
        let payload = payload::build(kind, &self.operation.params())?;
        let bytes = payload.to_canonical_bytes()?;

        info!("Built {} payload for {} ({} bytes)", kind, payload.ticker(), bytes.len());

        println!("{}", String::from_utf8_lossy(&bytes));
        if self.hex {
            println!("{}", hex::encode(&bytes));
        }

        Ok(())
    }
}
