//! # Ledger Module
//!
//! The fungible-token primitive the controller mutates, specified at its
//! interface boundary. `TokenLedger` is the in-process implementation used
//! by tests and the keeper; a deployment wraps its real token here.

use std::collections::HashMap;

use crate::errors::{CoreResult, TidalCoreError};
use crate::math::safe_math::{safe_add_u128, safe_sub_u128};
use crate::types::Address;

/// Balance and supply bookkeeping consumed by the rebase gate.
///
/// Implementations must be atomic per call: a failed mint/burn/transfer
/// leaves balances and total supply untouched.
pub trait Ledger {
    fn total_supply(&self) -> u128;
    fn balance_of(&self, holder: &Address) -> u128;
    fn mint(&mut self, to: &Address, amount: u128) -> CoreResult<()>;
    fn burn(&mut self, from: &Address, amount: u128) -> CoreResult<()>;
    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> CoreResult<()>;
}

/// In-memory token ledger: a balances map plus a running total supply
#[derive(Debug, Clone, Default)]
pub struct TokenLedger {
    balances: HashMap<Address, u128>,
    total_supply: u128,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger pre-seeded with one holder's balance
    pub fn seeded(holder: Address, amount: u128) -> Self {
        let mut balances = HashMap::new();
        balances.insert(holder, amount);
        Self { balances, total_supply: amount }
    }
}

impl Ledger for TokenLedger {
    fn total_supply(&self) -> u128 {
        self.total_supply
    }

    fn balance_of(&self, holder: &Address) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    fn mint(&mut self, to: &Address, amount: u128) -> CoreResult<()> {
        // Check the supply headroom before touching any balance
        let new_supply = safe_add_u128(self.total_supply, amount)?;
        let balance = self.balance_of(to);
        // Cannot overflow: balance <= total_supply and the supply add held
        self.balances.insert(*to, balance + amount);
        self.total_supply = new_supply;
        Ok(())
    }

    fn burn(&mut self, from: &Address, amount: u128) -> CoreResult<()> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(TidalCoreError::InsufficientBalance);
        }
        self.balances.insert(*from, balance - amount);
        self.total_supply = safe_sub_u128(self.total_supply, amount)?;
        Ok(())
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> CoreResult<()> {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(TidalCoreError::InsufficientBalance);
        }
        if from == to {
            return Ok(());
        }
        let to_balance = safe_add_u128(self.balance_of(to), amount)?;
        self.balances.insert(*from, from_balance - amount);
        self.balances.insert(*to, to_balance);
        Ok(())
    }
}
