//! Unit Tests
//!
//! Component-level tests: payload and envelope derivation, the maturity gate's
//! correlation and timing rules, and façade validation.

pub mod maturity_gate;
pub mod operator_validation;
