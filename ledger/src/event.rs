//! Ledger audit events

use serde::{Deserialize, Serialize};

/// Notification recorded by a successful ledger mutation.
///
/// Events are append-only observability output; nothing in the ledger reads
/// them back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    RewardsAdded { amount: u64 },
    WinnersAdded { timestamp: u64, added: u64 },
    RewardsClaimed { address: String, amount: u64 },
    KeeperSet { address: String, enabled: bool },
    RewardsWithdrawn { amount: u64 },
}
