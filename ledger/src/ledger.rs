//! Reward ledger state machine
//!
//! Accumulates per-address reward credits registered before the claim window
//! opens, pays each credit out exactly once while the window is live, and
//! lets the owner sweep residual funds once it has closed. Phases are pure
//! functions of wall-clock time against the two window bounds fixed at
//! construction; no operation changes the phase explicitly.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use reward_custodian::FundsCustodian;

use crate::clock::{Clock, SystemClock};
use crate::config::{CLAIM_WINDOW_SECS, COOLDOWN_SECS};
use crate::error::{LedgerError, Result};
use crate::event::LedgerEvent;

pub struct RewardLedger {
    owner: String,
    /// Account identifier the ledger holds at the custodian.
    address: String,
    asset: String,
    keepers: HashSet<String>,
    blacklist: HashSet<String>,
    /// Outstanding credits. Entries are kept non-zero; a claimed entry is
    /// removed rather than stored as 0.
    rewards: HashMap<String, u64>,
    /// Invariant: equals the sum of all `rewards` values.
    total_claimable: u64,
    last_winner_update: u64,
    claim_opens_at: u64,
    claim_ends_at: u64,
    events: Vec<LedgerEvent>,
    clock: Arc<dyn Clock>,
}

/// Point-in-time snapshot for reporting and serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerReport {
    pub asset: String,
    pub claim_opens_at: u64,
    pub claim_ends_at: u64,
    pub total_claimable: u64,
    pub winner_count: usize,
    pub keeper_count: usize,
    pub blacklist_count: usize,
    pub last_winner_update: u64,
    pub event_count: usize,
}

impl RewardLedger {
    /// Creates a ledger with the system clock. The claim window is
    /// `[claim_opens_at, claim_opens_at + 7 days]`, immutable afterwards.
    pub fn new(
        owner: impl Into<String>,
        address: impl Into<String>,
        asset: impl Into<String>,
        claim_opens_at: u64,
    ) -> Self {
        Self::with_clock(owner, address, asset, claim_opens_at, Arc::new(SystemClock))
    }

    pub fn with_clock(
        owner: impl Into<String>,
        address: impl Into<String>,
        asset: impl Into<String>,
        claim_opens_at: u64,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            owner: owner.into(),
            address: address.into(),
            asset: asset.into(),
            keepers: HashSet::new(),
            blacklist: HashSet::new(),
            rewards: HashMap::new(),
            total_claimable: 0,
            last_winner_update: 0,
            claim_opens_at,
            claim_ends_at: claim_opens_at + CLAIM_WINDOW_SECS,
            events: Vec::new(),
            clock,
        }
    }

    /// Grants or revokes keeper privileges. Owner only.
    pub fn set_keeper(&mut self, caller: &str, target: &str, enabled: bool) -> Result<()> {
        if caller != self.owner {
            return Err(LedgerError::Unauthorized);
        }

        if enabled {
            self.keepers.insert(target.to_string());
        } else {
            self.keepers.remove(target);
        }
        self.record(LedgerEvent::KeeperSet {
            address: target.to_string(),
            enabled,
        });
        Ok(())
    }

    /// Bars or re-admits an address for claiming. Owner or keeper.
    /// Blacklisting does not zero the target's credit.
    pub fn set_blacklisted(&mut self, caller: &str, target: &str, enabled: bool) -> Result<()> {
        if !self.is_operator(caller) {
            return Err(LedgerError::Unauthorized);
        }

        if enabled {
            self.blacklist.insert(target.to_string());
        } else {
            self.blacklist.remove(target);
        }
        log::debug!("blacklist {} = {}", target, enabled);
        Ok(())
    }

    /// Moves `amount` from the caller into the ledger's custodian account.
    /// Owner or keeper. Funding is a separate track from `total_claimable`
    /// so operators can pre-fund before winners are known.
    pub fn top_up_funds(
        &mut self,
        caller: &str,
        amount: u64,
        custodian: &mut dyn FundsCustodian,
    ) -> Result<()> {
        if !self.is_operator(caller) {
            return Err(LedgerError::Unauthorized);
        }

        let available = custodian.balance_of(caller);
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                requested: amount,
                available,
            });
        }

        custodian.transfer_from(&self.address, caller, &self.address, amount)?;
        self.record(LedgerEvent::RewardsAdded { amount });
        Ok(())
    }

    /// Registers a batch of winners, accumulating credits per address.
    /// Owner or keeper, only before the claim window opens, and at most
    /// once per cooldown period. The batch is validated in full before any
    /// entry is applied.
    pub fn add_winners(&mut self, caller: &str, addresses: &[String], amounts: &[u64]) -> Result<()> {
        if !self.is_operator(caller) {
            return Err(LedgerError::Unauthorized);
        }

        let now = self.clock.now();
        let retry_at = self.last_winner_update + COOLDOWN_SECS;
        if now < retry_at {
            return Err(LedgerError::CooldownActive { retry_at });
        }
        if addresses.len() != amounts.len() {
            return Err(LedgerError::ArrayLengthMismatch {
                addresses: addresses.len(),
                amounts: amounts.len(),
            });
        }
        if addresses.is_empty() {
            return Err(LedgerError::EmptyInput);
        }
        if now > self.claim_opens_at {
            return Err(LedgerError::ClaimAlreadyOpen);
        }

        let mut added: u64 = 0;
        for &amount in amounts {
            added = added.checked_add(amount).ok_or(LedgerError::AmountOverflow)?;
        }
        // Every entry is bounded by the total, so checking the running total
        // covers per-entry overflow as well.
        let total = self
            .total_claimable
            .checked_add(added)
            .ok_or(LedgerError::AmountOverflow)?;

        self.last_winner_update = now;
        for (address, &amount) in addresses.iter().zip(amounts) {
            *self.rewards.entry(address.clone()).or_insert(0) += amount;
        }
        self.total_claimable = total;
        self.record(LedgerEvent::WinnersAdded {
            timestamp: now,
            added,
        });
        Ok(())
    }

    /// Pays out the caller's credited balance. Open to any address while
    /// the claim window is live; each credit pays exactly once.
    ///
    /// The credit is zeroed before the external transfer so a re-entrant
    /// claim observes nothing owed; if the transfer fails the credit is
    /// restored, making the whole operation all-or-nothing.
    pub fn claim_rewards(&mut self, caller: &str, custodian: &mut dyn FundsCustodian) -> Result<()> {
        if self.blacklist.contains(caller) {
            return Err(LedgerError::Blacklisted);
        }

        let now = self.clock.now();
        if now < self.claim_opens_at || now > self.claim_ends_at {
            return Err(LedgerError::ClaimWindowClosed);
        }

        let reward = self.rewards.get(caller).copied().unwrap_or(0);
        if reward == 0 {
            return Err(LedgerError::NoRewardsOwed);
        }

        let available = custodian.balance_of(&self.address);
        if available < reward {
            return Err(LedgerError::InsufficientFunds {
                requested: reward,
                available,
            });
        }

        self.rewards.remove(caller);
        self.total_claimable -= reward;

        if let Err(e) = custodian.transfer(&self.address, caller, reward) {
            self.rewards.insert(caller.to_string(), reward);
            self.total_claimable += reward;
            return Err(e.into());
        }

        self.record(LedgerEvent::RewardsClaimed {
            address: caller.to_string(),
            amount: reward,
        });
        Ok(())
    }

    /// Sweeps the ledger's full balance at `custodian` to the owner once
    /// the claim window has closed. The custodian argument is caller-
    /// supplied and need not hold the reward asset, so stray deposits of
    /// other assets can be recovered too.
    pub fn withdraw_all(&mut self, caller: &str, custodian: &mut dyn FundsCustodian) -> Result<()> {
        if caller != self.owner {
            return Err(LedgerError::Unauthorized);
        }
        if self.clock.now() <= self.claim_ends_at {
            return Err(LedgerError::ClaimingNotOver);
        }

        let balance = custodian.balance_of(&self.address);
        if balance == 0 {
            return Err(LedgerError::ContractEmpty);
        }

        custodian.transfer(&self.address, caller, balance)?;
        self.record(LedgerEvent::RewardsWithdrawn { amount: balance });
        Ok(())
    }

    pub fn pending_rewards(&self, address: &str) -> u64 {
        self.rewards.get(address).copied().unwrap_or(0)
    }

    pub fn is_claiming_live(&self) -> bool {
        let now = self.clock.now();
        self.claim_opens_at <= now && now <= self.claim_ends_at
    }

    /// Balance backing the obligations; expected to stay at or above
    /// `total_claimable`, though top-ups do not enforce it.
    pub fn contract_reward_balance(&self, custodian: &dyn FundsCustodian) -> u64 {
        custodian.balance_of(&self.address)
    }

    /// Seconds until the claim window opens, 0 once it has.
    pub fn time_to_claim(&self) -> u64 {
        self.claim_opens_at.saturating_sub(self.clock.now())
    }

    pub fn total_claimable(&self) -> u64 {
        self.total_claimable
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn claim_opens_at(&self) -> u64 {
        self.claim_opens_at
    }

    pub fn claim_ends_at(&self) -> u64 {
        self.claim_ends_at
    }

    pub fn is_keeper(&self, address: &str) -> bool {
        self.keepers.contains(address)
    }

    pub fn is_blacklisted(&self, address: &str) -> bool {
        self.blacklist.contains(address)
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    pub fn report(&self) -> LedgerReport {
        LedgerReport {
            asset: self.asset.clone(),
            claim_opens_at: self.claim_opens_at,
            claim_ends_at: self.claim_ends_at,
            total_claimable: self.total_claimable,
            winner_count: self.rewards.len(),
            keeper_count: self.keepers.len(),
            blacklist_count: self.blacklist.len(),
            last_winner_update: self.last_winner_update,
            event_count: self.events.len(),
        }
    }

    fn is_operator(&self, caller: &str) -> bool {
        caller == self.owner || self.keepers.contains(caller)
    }

    fn record(&mut self, event: LedgerEvent) {
        log::info!("ledger event: {:?}", event);
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const OPENS_AT: u64 = 1_000_000;

    fn test_ledger(now: u64) -> (RewardLedger, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(now));
        let ledger = RewardLedger::with_clock(
            "owner",
            "ledger-account",
            "RWD",
            OPENS_AT,
            clock.clone(),
        );
        (ledger, clock)
    }

    #[test]
    fn test_window_fixed_at_construction() {
        let (ledger, _) = test_ledger(0);
        assert_eq!(ledger.claim_ends_at(), OPENS_AT + CLAIM_WINDOW_SECS);
    }

    #[test]
    fn test_set_keeper_owner_only() {
        let (mut ledger, _) = test_ledger(0);

        assert_eq!(
            ledger.set_keeper("mallory", "keeper1", true),
            Err(LedgerError::Unauthorized)
        );

        ledger.set_keeper("owner", "keeper1", true).unwrap();
        assert!(ledger.is_keeper("keeper1"));

        // Keepers cannot appoint keepers.
        assert_eq!(
            ledger.set_keeper("keeper1", "keeper2", true),
            Err(LedgerError::Unauthorized)
        );

        ledger.set_keeper("owner", "keeper1", false).unwrap();
        assert!(!ledger.is_keeper("keeper1"));
    }

    #[test]
    fn test_set_blacklisted_owner_or_keeper() {
        let (mut ledger, _) = test_ledger(0);
        ledger.set_keeper("owner", "keeper1", true).unwrap();

        ledger.set_blacklisted("keeper1", "cheater", true).unwrap();
        assert!(ledger.is_blacklisted("cheater"));

        assert_eq!(
            ledger.set_blacklisted("cheater", "keeper1", true),
            Err(LedgerError::Unauthorized)
        );

        ledger.set_blacklisted("owner", "cheater", false).unwrap();
        assert!(!ledger.is_blacklisted("cheater"));
    }

    #[test]
    fn test_add_winners_accumulates_repeated_addresses() {
        let (mut ledger, _) = test_ledger(OPENS_AT - 10_000);

        ledger
            .add_winners(
                "owner",
                &["a".to_string(), "b".to_string(), "a".to_string()],
                &[100, 50, 25],
            )
            .unwrap();

        assert_eq!(ledger.pending_rewards("a"), 125);
        assert_eq!(ledger.pending_rewards("b"), 50);
        assert_eq!(ledger.total_claimable(), 175);
    }

    #[test]
    fn test_add_winners_guard_order() {
        let (mut ledger, clock) = test_ledger(OPENS_AT - 10_000);

        ledger
            .add_winners("owner", &["a".to_string()], &[1])
            .unwrap();

        // Cooldown is checked before the length mismatch.
        assert_eq!(
            ledger.add_winners("owner", &["a".to_string()], &[1, 2]),
            Err(LedgerError::CooldownActive {
                retry_at: OPENS_AT - 10_000 + COOLDOWN_SECS,
            })
        );

        clock.advance(COOLDOWN_SECS);
        assert_eq!(
            ledger.add_winners("owner", &["a".to_string()], &[1, 2]),
            Err(LedgerError::ArrayLengthMismatch {
                addresses: 1,
                amounts: 2,
            })
        );
        assert_eq!(ledger.add_winners("owner", &[], &[]), Err(LedgerError::EmptyInput));

        clock.set(OPENS_AT + 1);
        assert_eq!(
            ledger.add_winners("owner", &["a".to_string()], &[1]),
            Err(LedgerError::ClaimAlreadyOpen)
        );

        // Only the first batch went through.
        assert_eq!(ledger.total_claimable(), 1);
    }

    #[test]
    fn test_add_winners_at_exact_open_boundary() {
        let (mut ledger, _) = test_ledger(OPENS_AT);

        ledger
            .add_winners("owner", &["a".to_string()], &[10])
            .unwrap();
        assert_eq!(ledger.pending_rewards("a"), 10);
    }

    #[test]
    fn test_add_winners_overflow_rejected_whole() {
        let (mut ledger, clock) = test_ledger(OPENS_AT - 10_000);

        ledger
            .add_winners("owner", &["a".to_string()], &[u64::MAX - 10])
            .unwrap();
        clock.advance(COOLDOWN_SECS);

        assert_eq!(
            ledger.add_winners("owner", &["b".to_string(), "c".to_string()], &[5, 20]),
            Err(LedgerError::AmountOverflow)
        );
        // Nothing from the failed batch was applied.
        assert_eq!(ledger.pending_rewards("b"), 0);
        assert_eq!(ledger.pending_rewards("c"), 0);
        assert_eq!(ledger.total_claimable(), u64::MAX - 10);
    }

    #[test]
    fn test_time_to_claim_saturates() {
        let (ledger, clock) = test_ledger(OPENS_AT - 300);
        assert_eq!(ledger.time_to_claim(), 300);

        clock.set(OPENS_AT + 500);
        assert_eq!(ledger.time_to_claim(), 0);
    }

    #[test]
    fn test_is_claiming_live_inclusive_bounds() {
        let (ledger, clock) = test_ledger(OPENS_AT - 1);
        assert!(!ledger.is_claiming_live());

        clock.set(OPENS_AT);
        assert!(ledger.is_claiming_live());

        clock.set(ledger.claim_ends_at());
        assert!(ledger.is_claiming_live());

        clock.set(ledger.claim_ends_at() + 1);
        assert!(!ledger.is_claiming_live());
    }

    #[test]
    fn test_report_snapshot() {
        let (mut ledger, _) = test_ledger(OPENS_AT - 10_000);
        ledger.set_keeper("owner", "keeper1", true).unwrap();
        ledger
            .add_winners("keeper1", &["a".to_string(), "b".to_string()], &[7, 3])
            .unwrap();

        let report = ledger.report();
        assert_eq!(report.total_claimable, 10);
        assert_eq!(report.winner_count, 2);
        assert_eq!(report.keeper_count, 1);
        assert_eq!(report.last_winner_update, OPENS_AT - 10_000);
        // KeeperSet + WinnersAdded
        assert_eq!(report.event_count, 2);
    }
}
