use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::errors::{AppError, AppResult};
use crate::maturity::DEFAULT_RECENT_CAPACITY;
use crate::orchestrator::RunSettings;
use crate::types::Network;
use crate::utils::currency::kas_to_sompi;

/// Config file looked up in the working directory (krc20.toml)
pub const DEFAULT_CONFIG_NAME: &str = "krc20";

/// Application configuration loaded from krc20.toml or environment variables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub network: NetworkConfig,
    pub operation: OperationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub id: String,
}

/// Fees (in KAS, as decimal strings) and wait bounds for each run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationConfig {
    pub priority_fee: String,
    pub reveal_priority_fee: String,
    pub phase_timeout_ms: u64,
    pub recent_match_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig {
                id: Network::default().id().to_string(),
            },
            operation: OperationConfig::default(),
        }
    }
}

impl Default for OperationConfig {
    fn default() -> Self {
        Self {
            priority_fee: "0.1".to_string(),
            reveal_priority_fee: "0.1".to_string(),
            phase_timeout_ms: 20_000,
            recent_match_capacity: DEFAULT_RECENT_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Load configuration from krc20.toml (if present) and environment variables
    /// Environment variables take precedence over file configuration
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load with an explicit config file, which must then exist
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();
        let builder = Config::builder()
            // Start with default values
            .set_default("network.id", defaults.network.id)?
            .set_default("operation.priority_fee", defaults.operation.priority_fee)?
            .set_default(
                "operation.reveal_priority_fee",
                defaults.operation.reveal_priority_fee,
            )?
            .set_default("operation.phase_timeout_ms", defaults.operation.phase_timeout_ms)?
            .set_default(
                "operation.recent_match_capacity",
                defaults.operation.recent_match_capacity as i64,
            )?;

        let builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_NAME).required(false)),
        };

        // KRC20_NETWORK__ID, KRC20_OPERATION__PHASE_TIMEOUT_MS, ...
        builder
            .add_source(
                Environment::with_prefix("KRC20")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn network(&self) -> AppResult<Network> {
        self.network.id.parse()
    }

    /// Resolve into the sompi and `Duration` values a run works with
    pub fn run_settings(&self) -> AppResult<RunSettings> {
        if self.operation.phase_timeout_ms == 0 {
            return Err(AppError::Config(
                "operation.phase_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.operation.recent_match_capacity == 0 {
            return Err(AppError::Config(
                "operation.recent_match_capacity must be greater than zero".to_string(),
            ));
        }

        Ok(RunSettings {
            network: self.network()?,
            priority_fee: kas_to_sompi(&self.operation.priority_fee)?,
            reveal_priority_fee: kas_to_sompi(&self.operation.reveal_priority_fee)?,
            phase_timeout: Duration::from_millis(self.operation.phase_timeout_ms),
            recent_match_capacity: self.operation.recent_match_capacity,
        })
    }
}
