//! In-memory account ledger for a single fungible asset

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{CustodianError, Result};

/// Moves value between accounts on behalf of callers.
///
/// `transfer_from` requires the spender to hold an allowance granted by
/// `from`; `transfer` moves the caller's own balance. Either call fails
/// whole if the source balance is short.
pub trait FundsCustodian {
    fn balance_of(&self, holder: &str) -> u64;

    fn transfer(&mut self, from: &str, to: &str, amount: u64) -> Result<()>;

    fn transfer_from(&mut self, spender: &str, from: &str, to: &str, amount: u64) -> Result<()>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenVault {
    asset: String,
    balances: HashMap<String, u64>,
    allowances: HashMap<(String, String), u64>,
}

impl TokenVault {
    pub fn new(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// Credits `to` with freshly issued units.
    pub fn mint(&mut self, to: &str, amount: u64) -> Result<()> {
        let balance = self.balances.entry(to.to_string()).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(CustodianError::Overflow)?;
        Ok(())
    }

    /// Grants `spender` the right to move up to `amount` of `owner`'s funds.
    pub fn approve(&mut self, owner: &str, spender: &str, amount: u64) {
        self.allowances
            .insert((owner.to_string(), spender.to_string()), amount);
    }

    pub fn allowance(&self, owner: &str, spender: &str) -> u64 {
        self.allowances
            .get(&(owner.to_string(), spender.to_string()))
            .copied()
            .unwrap_or(0)
    }

    fn move_balance(&mut self, from: &str, to: &str, amount: u64) -> Result<()> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(CustodianError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        let recipient = self.balance_of(to);
        let credited = recipient.checked_add(amount).ok_or(CustodianError::Overflow)?;

        self.balances.insert(from.to_string(), available - amount);
        self.balances.insert(to.to_string(), credited);
        Ok(())
    }
}

impl FundsCustodian for TokenVault {
    fn balance_of(&self, holder: &str) -> u64 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    fn transfer(&mut self, from: &str, to: &str, amount: u64) -> Result<()> {
        self.move_balance(from, to, amount)
    }

    fn transfer_from(&mut self, spender: &str, from: &str, to: &str, amount: u64) -> Result<()> {
        let approved = self.allowance(from, spender);
        if approved < amount {
            return Err(CustodianError::AllowanceExceeded {
                requested: amount,
                approved,
            });
        }

        self.move_balance(from, to, amount)?;
        self.allowances
            .insert((from.to_string(), spender.to_string()), approved - amount);
        Ok(())
    }
}
