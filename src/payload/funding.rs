//! Commit-side funding table
//!
//! Value the commit transaction locks in the script-hash output, keyed by
//! operation kind. Fixed by protocol usage, not by configuration.

use super::OperationKind;
use crate::utils::currency::SOMPI_PER_KAS;

/// Deploy locks 1000 KAS
pub const DEPLOY_FUNDING_SOMPI: u64 = 1000 * SOMPI_PER_KAS;

/// Mint locks 1 KAS
pub const MINT_FUNDING_SOMPI: u64 = SOMPI_PER_KAS;

/// Transfer locks nothing beyond network fees
pub const TRANSFER_FUNDING_SOMPI: u64 = 0;

pub fn commit_funding(kind: OperationKind) -> u64 {
    match kind {
        OperationKind::Deploy => DEPLOY_FUNDING_SOMPI,
        OperationKind::Mint => MINT_FUNDING_SOMPI,
        OperationKind::Transfer => TRANSFER_FUNDING_SOMPI,
    }
}
