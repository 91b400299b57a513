use clap::Args;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::utils::currency::format_sompi_as_kas;

/// Print the effective configuration
#[derive(Args)]
pub struct ConfigCommand {
    /// Config file to load instead of ./krc20.toml
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl ConfigCommand {
    pub fn run(&self) -> AppResult<()> {
        let config = AppConfig::load_from(self.file.as_deref())
            .map_err(|e| AppError::Config(format!("Failed to load configuration: {}", e)))?;
        let settings = config.run_settings()?;

        println!("\n=== Configuration ===");
        println!("Network:               {}", settings.network);
        println!("Priority fee:          {}", format_sompi_as_kas(settings.priority_fee));
        println!("Reveal priority fee:   {}", format_sompi_as_kas(settings.reveal_priority_fee));
        println!("Phase timeout:         {:?}", settings.phase_timeout);
        println!("Recent match capacity: {}", settings.recent_match_capacity);

        Ok(())
    }
}
