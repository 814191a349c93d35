//! Reward-Distribution Ledger
//!
//! Administrator-controlled registry of per-address reward credits:
//! - owner manages keepers; owner and keepers manage the blacklist,
//!   fund the pool and register winners before the claim window opens
//! - each credited address claims its balance exactly once while the
//!   seven-day window is live
//! - the owner sweeps residual funds after the window closes
//!
//! Value is held by the `reward-custodian` crate; this crate only tracks
//! obligations and enforces the guards around moving them.

pub mod clock;
pub mod error;
pub mod event;
pub mod ledger;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{LedgerError, Result};
pub use event::LedgerEvent;
pub use ledger::{LedgerReport, RewardLedger};
pub use service::SharedLedger;

/// Ledger timing constants
pub mod config {
    /// Minimum spacing between winner registrations (5 minutes).
    pub const COOLDOWN_SECS: u64 = 300;

    /// Claim window length (7 days).
    pub const CLAIM_WINDOW_SECS: u64 = 7 * 86_400;
}
