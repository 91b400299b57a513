//! Currency utilities for Kaspa and sompi values
//!
//! Amounts travel through the crate as integer sompi. Operators configure and
//! read them in KAS, so this module provides exact decimal parsing (no floating
//! point on the way in) and the dual KAS + sompi display used in logs.

use crate::errors::{AppError, AppResult};

/// Sompi per Kaspa
pub const SOMPI_PER_KAS: u64 = 100_000_000;

/// Decimal places of one KAS
const KAS_DECIMALS: usize = 8;

/// Parse a decimal KAS string into sompi
///
/// Accepts plain decimal notation with at most eight fractional digits.
///
/// # Examples
/// ```
/// use krc20_inscribe::utils::currency::kas_to_sompi;
///
/// assert_eq!(kas_to_sompi("1").unwrap(), 100_000_000);
/// assert_eq!(kas_to_sompi("0.1").unwrap(), 10_000_000);
/// assert_eq!(kas_to_sompi("1.5").unwrap(), 150_000_000);
/// ```
pub fn kas_to_sompi(amount: &str) -> AppResult<u64> {
    let amount = amount.trim();
    let invalid = |reason: &str| AppError::InvalidData(format!("invalid KAS amount '{}': {}", amount, reason));

    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (amount, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("empty"));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("expected decimal digits"));
    }
    if fraction.len() > KAS_DECIMALS {
        return Err(invalid("more than 8 decimal places"));
    }

    let whole_sompi = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<u64>()
            .ok()
            .and_then(|kas| kas.checked_mul(SOMPI_PER_KAS))
            .ok_or_else(|| invalid("overflow"))?
    };

    let fraction_sompi = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", fraction, width = KAS_DECIMALS);
        padded.parse::<u64>().map_err(|_| invalid("bad fraction"))?
    };

    whole_sompi
        .checked_add(fraction_sompi)
        .ok_or_else(|| invalid("overflow"))
}

/// Format a sompi amount as dual KAS + sompi display
///
/// # Examples
/// ```
/// use krc20_inscribe::utils::currency::format_sompi_as_kas;
///
/// assert_eq!(
///     format_sompi_as_kas(100_000_000_000),
///     "1000.00000000 KAS (100000000000 sompi)"
/// );
/// assert_eq!(format_sompi_as_kas(5471), "0.00005471 KAS (5471 sompi)");
/// ```
pub fn format_sompi_as_kas(sompi: u64) -> String {
    format!(
        "{}.{:08} KAS ({} sompi)",
        sompi / SOMPI_PER_KAS,
        sompi % SOMPI_PER_KAS,
        sompi
    )
}
