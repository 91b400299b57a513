use thiserror::Error;

/// Application-wide error type - single point of truth
#[derive(Error, Debug)]
pub enum AppError {
    /// Operation parameters rejected before anything is built
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Envelope script construction
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    /// Ledger subsystem operations
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// File I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration issues
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation/parsing
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Operation parameter errors, raised locally and never submitted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A field the operation requires was not supplied
    #[error("{operation} requires field '{field}'")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    /// A supplied field has an unusable value
    #[error("invalid value for '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Operation name not one of mint/deploy/transfer
    #[error("unknown operation: {0}")]
    UnknownOperation(String),
}

/// Envelope script construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// Payload (or the redeem script carrying it) exceeds the script element limit
    #[error("payload too large: {size} bytes exceeds the {limit}-byte script element limit")]
    PayloadTooLarge { size: usize, limit: usize },

    /// Payload serialisation or push encoding failed
    #[error("script encoding failed: {0}")]
    Encoding(String),
}

/// Ledger subsystem error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Ledger rejected or failed to relay a transaction
    #[error("Broadcast failed: {0}")]
    Broadcast(String),

    /// RPC query failed (UTXO lookup, server info, etc.)
    #[error("Query failed: {method} - {message}")]
    Query { method: String, message: String },

    /// Transaction construction failed (insufficient funds, mass limits, etc.)
    #[error("Transaction build failed: {0}")]
    Build(String),

    /// Signing an input failed
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Address change subscription could not be established
    #[error("Subscription failed: {0}")]
    Subscription(String),
}

/// Application-wide result type - single point of truth
pub type AppResult<T> = Result<T, AppError>;

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

// Additional From implementations for common error types
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidData(format!("JSON error: {}", err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<hex::FromHexError> for AppError {
    fn from(err: hex::FromHexError) -> Self {
        AppError::InvalidData(format!("Hex decode error: {}", err))
    }
}

impl From<kaspa_txscript::script_builder::ScriptBuilderError> for ScriptError {
    fn from(err: kaspa_txscript::script_builder::ScriptBuilderError) -> Self {
        ScriptError::Encoding(err.to_string())
    }
}
