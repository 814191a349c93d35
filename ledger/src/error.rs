//! Reward ledger error types

use reward_custodian::CustodianError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Caller is not authorized for this operation")]
    Unauthorized,

    #[error("Winner registration cooldown active: retry at {retry_at}")]
    CooldownActive { retry_at: u64 },

    #[error("Winner and amount arrays differ in length: {addresses} vs {amounts}")]
    ArrayLengthMismatch { addresses: usize, amounts: usize },

    #[error("Winner batch is empty")]
    EmptyInput,

    #[error("Claim window already open; winner registration is closed")]
    ClaimAlreadyOpen,

    #[error("Claim window is not open")]
    ClaimWindowClosed,

    #[error("Claiming period is not over")]
    ClaimingNotOver,

    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: u64, available: u64 },

    #[error("No residual balance to withdraw")]
    ContractEmpty,

    #[error("No rewards owed to caller")]
    NoRewardsOwed,

    #[error("Caller is blacklisted")]
    Blacklisted,

    #[error("Reward amount overflow")]
    AmountOverflow,

    #[error("Custodian error: {0}")]
    Custodian(#[from] CustodianError),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
