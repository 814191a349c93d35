//! Shared ledger handle
//!
//! Every operation is serialized behind one mutex holding both the ledger
//! and its vault, so the claim path's balance check and transfer can never
//! interleave with another claim. Cloning the handle shares the same state.

use parking_lot::Mutex;
use std::sync::Arc;

use reward_custodian::TokenVault;

use crate::error::Result;
use crate::event::LedgerEvent;
use crate::ledger::{LedgerReport, RewardLedger};

#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    ledger: RewardLedger,
    vault: TokenVault,
}

impl SharedLedger {
    pub fn new(ledger: RewardLedger, vault: TokenVault) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner { ledger, vault })),
        }
    }

    pub fn set_keeper(&self, caller: &str, target: &str, enabled: bool) -> Result<()> {
        self.inner.lock().ledger.set_keeper(caller, target, enabled)
    }

    pub fn set_blacklisted(&self, caller: &str, target: &str, enabled: bool) -> Result<()> {
        self.inner
            .lock()
            .ledger
            .set_blacklisted(caller, target, enabled)
    }

    pub fn top_up_funds(&self, caller: &str, amount: u64) -> Result<()> {
        let mut guard = self.inner.lock();
        let Inner { ledger, vault } = &mut *guard;
        ledger.top_up_funds(caller, amount, vault)
    }

    pub fn add_winners(&self, caller: &str, addresses: &[String], amounts: &[u64]) -> Result<()> {
        self.inner.lock().ledger.add_winners(caller, addresses, amounts)
    }

    pub fn claim_rewards(&self, caller: &str) -> Result<()> {
        let mut guard = self.inner.lock();
        let Inner { ledger, vault } = &mut *guard;
        ledger.claim_rewards(caller, vault)
    }

    pub fn withdraw_all(&self, caller: &str) -> Result<()> {
        let mut guard = self.inner.lock();
        let Inner { ledger, vault } = &mut *guard;
        ledger.withdraw_all(caller, vault)
    }

    pub fn pending_rewards(&self, address: &str) -> u64 {
        self.inner.lock().ledger.pending_rewards(address)
    }

    pub fn is_claiming_live(&self) -> bool {
        self.inner.lock().ledger.is_claiming_live()
    }

    pub fn contract_reward_balance(&self) -> u64 {
        let guard = self.inner.lock();
        guard.ledger.contract_reward_balance(&guard.vault)
    }

    pub fn time_to_claim(&self) -> u64 {
        self.inner.lock().ledger.time_to_claim()
    }

    pub fn total_claimable(&self) -> u64 {
        self.inner.lock().ledger.total_claimable()
    }

    pub fn events(&self) -> Vec<LedgerEvent> {
        self.inner.lock().ledger.events().to_vec()
    }

    pub fn report(&self) -> LedgerReport {
        self.inner.lock().ledger.report()
    }

    /// Direct vault access for funding and approvals.
    pub fn with_vault<R>(&self, f: impl FnOnce(&mut TokenVault) -> R) -> R {
        f(&mut self.inner.lock().vault)
    }
}
