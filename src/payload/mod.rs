//! KRC-20 operation payloads
//!
//! Turns a typed operation description into the canonical JSON payload that is
//! embedded in the envelope script. The serialisation is the on-chain payload:
//! key order is fixed by the struct layout, absent fields are omitted, and the
//! output is compact, so the same payload always yields the same bytes.
//!
//! ## Shapes
//!
//! - **mint**: `{"p":"krc-20","op":"mint","tick":"..."}`
//! - **deploy**: adds `max`, `lim` (required) and `dec`, `pre` (optional)
//! - **transfer**: adds `to` (required) and `amt` (optional)

mod funding;

pub use funding::{commit_funding, DEPLOY_FUNDING_SOMPI, MINT_FUNDING_SOMPI, TRANSFER_FUNDING_SOMPI};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{ScriptError, ValidationError};

/// Protocol identifier carried in every payload
pub const PROTOCOL: &str = "krc-20";

/// KRC-20 operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Mint,
    Deploy,
    Transfer,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Mint => "mint",
            OperationKind::Deploy => "deploy",
            OperationKind::Transfer => "transfer",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mint" => Ok(OperationKind::Mint),
            "deploy" => Ok(OperationKind::Deploy),
            "transfer" => Ok(OperationKind::Transfer),
            other => Err(ValidationError::UnknownOperation(other.to_string())),
        }
    }
}

/// Caller-supplied operation parameters; which fields matter depends on the kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationParams {
    pub ticker: String,
    pub max_supply: Option<String>,
    pub mint_limit: Option<String>,
    pub decimals: Option<String>,
    pub preallocation: Option<String>,
    pub amount: Option<String>,
    pub destination: Option<String>,
}

impl OperationParams {
    pub fn for_ticker(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            ..Self::default()
        }
    }
}

/// Validated KRC-20 operation payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationPayload {
    #[serde(rename = "p")]
    protocol: String,
    op: OperationKind,
    #[serde(rename = "tick")]
    ticker: String,
    #[serde(rename = "max", default, skip_serializing_if = "Option::is_none")]
    max_supply: Option<String>,
    #[serde(rename = "lim", default, skip_serializing_if = "Option::is_none")]
    mint_limit: Option<String>,
    #[serde(rename = "dec", default, skip_serializing_if = "Option::is_none")]
    decimals: Option<String>,
    #[serde(rename = "pre", default, skip_serializing_if = "Option::is_none")]
    preallocation: Option<String>,
    #[serde(rename = "amt", default, skip_serializing_if = "Option::is_none")]
    amount: Option<String>,
    #[serde(rename = "to", default, skip_serializing_if = "Option::is_none")]
    destination: Option<String>,
}

/// Build a validated payload for `kind` from `params`
///
/// Fields that do not belong to the operation are dropped, so a mint never
/// carries deploy parameters into its envelope.
pub fn build(kind: OperationKind, params: &OperationParams) -> Result<OperationPayload, ValidationError> {
    let mut payload = OperationPayload {
        protocol: PROTOCOL.to_string(),
        op: kind,
        ticker: params.ticker.clone(),
        max_supply: None,
        mint_limit: None,
        decimals: None,
        preallocation: None,
        amount: None,
        destination: None,
    };

    match kind {
        OperationKind::Mint => {}
        OperationKind::Deploy => {
            payload.max_supply = params.max_supply.clone();
            payload.mint_limit = params.mint_limit.clone();
            payload.decimals = params.decimals.clone();
            payload.preallocation = params.preallocation.clone();
        }
        OperationKind::Transfer => {
            payload.amount = params.amount.clone();
            payload.destination = params.destination.clone();
        }
    }

    payload.validate()?;
    Ok(payload)
}

impl OperationPayload {
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn kind(&self) -> OperationKind {
        self.op
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn max_supply(&self) -> Option<&str> {
        self.max_supply.as_deref()
    }

    pub fn mint_limit(&self) -> Option<&str> {
        self.mint_limit.as_deref()
    }

    pub fn decimals(&self) -> Option<&str> {
        self.decimals.as_deref()
    }

    pub fn preallocation(&self) -> Option<&str> {
        self.preallocation.as_deref()
    }

    pub fn amount(&self) -> Option<&str> {
        self.amount.as_deref()
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// Canonical on-chain bytes (compact JSON, fixed key order)
    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>, ScriptError> {
        serde_json::to_vec(self).map_err(|e| ScriptError::Encoding(e.to_string()))
    }

    /// Parse canonical bytes back into a payload, re-checking all constraints
    pub fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, ValidationError> {
        let payload: OperationPayload =
            serde_json::from_slice(bytes).map_err(|e| ValidationError::InvalidField {
                field: "payload",
                reason: e.to_string(),
            })?;
        payload.validate()?;
        Ok(payload)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.protocol != PROTOCOL {
            return Err(ValidationError::InvalidField {
                field: "protocol",
                reason: format!("expected '{}', got '{}'", PROTOCOL, self.protocol),
            });
        }

        if self.ticker.is_empty() || !self.ticker.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ValidationError::InvalidField {
                field: "ticker",
                reason: format!("'{}' is not a non-empty ASCII alphanumeric ticker", self.ticker),
            });
        }

        let operation = self.op.as_str();
        match self.op {
            OperationKind::Mint => {}
            OperationKind::Deploy => {
                require(operation, "maxSupply", &self.max_supply)?;
                require(operation, "mintLimit", &self.mint_limit)?;
            }
            OperationKind::Transfer => {
                require(operation, "destination", &self.destination)?;
            }
        }

        check_digits("maxSupply", &self.max_supply)?;
        check_digits("mintLimit", &self.mint_limit)?;
        check_digits("decimals", &self.decimals)?;
        check_digits("preallocation", &self.preallocation)?;
        check_digits("amount", &self.amount)?;

        if let Some(destination) = &self.destination {
            if destination.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: "destination",
                    reason: "empty address".to_string(),
                });
            }
        }

        Ok(())
    }
}

fn require(
    operation: &'static str,
    field: &'static str,
    value: &Option<String>,
) -> Result<(), ValidationError> {
    match value {
        Some(_) => Ok(()),
        None => Err(ValidationError::MissingField { operation, field }),
    }
}

fn check_digits(field: &'static str, value: &Option<String>) -> Result<(), ValidationError> {
    match value {
        Some(v) if v.is_empty() || !v.chars().all(|c| c.is_ascii_digit()) => {
            Err(ValidationError::InvalidField {
                field,
                reason: format!("'{}' is not a decimal integer", v),
            })
        }
        _ => Ok(()),
    }
}
