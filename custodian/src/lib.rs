//! Funds custodian for the reward ledger
//!
//! Account-balance ledger for a single fungible asset. The reward ledger
//! only tracks obligations; the value backing them is held and moved here,
//! on top-ups, claims and the post-event sweep.

pub mod error;
pub mod vault;

pub use error::{CustodianError, Result};
pub use vault::{FundsCustodian, TokenVault};
