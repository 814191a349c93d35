//! Custodian error types

use thiserror::Error;

/// Funds custodian errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CustodianError {
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u64, available: u64 },

    #[error("Allowance exceeded: requested {requested}, approved {approved}")]
    AllowanceExceeded { requested: u64, approved: u64 },

    #[error("Balance overflow")]
    Overflow,
}

pub type Result<T> = std::result::Result<T, CustodianError>;
