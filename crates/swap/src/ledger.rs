//! Per-depositor balance ledger

use alloy_primitives::{Address, U256};
use std::collections::HashMap;

use ethbtc_core::{SwapError, SwapResult};

/// Native-currency balances held on behalf of depositors
///
/// Not synchronized; the owner serializes access.
#[derive(Debug, Default)]
pub struct BalanceLedger {
    balances: HashMap<Address, U256>,
    total: U256,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, depositor: Address) -> U256 {
        self.balances.get(&depositor).copied().unwrap_or(U256::ZERO)
    }

    /// Sum of all balances
    pub fn total(&self) -> U256 {
        self.total
    }

    /// Number of depositors with a non-zero balance
    pub fn depositor_count(&self) -> usize {
        self.balances.len()
    }

    /// Credit `amount`, returning the new balance
    pub fn credit(&mut self, depositor: Address, amount: U256) -> SwapResult<U256> {
        if amount.is_zero() {
            return Ok(self.balance_of(depositor));
        }

        let total = self
            .total
            .checked_add(amount)
            .ok_or(SwapError::ArithmeticOverflow)?;

        let balance = self.balances.entry(depositor).or_insert(U256::ZERO);
        // per-depositor balance never exceeds the total
        *balance += amount;
        self.total = total;
        Ok(*balance)
    }

    /// Debit `amount`, returning the new balance. Leaves the ledger untouched
    /// on insufficient balance.
    pub fn debit(&mut self, depositor: Address, amount: U256) -> SwapResult<U256> {
        let available = self.balance_of(depositor);
        if amount > available {
            return Err(SwapError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        let remaining = available - amount;
        if remaining.is_zero() {
            self.balances.remove(&depositor);
        } else {
            self.balances.insert(depositor, remaining);
        }
        self.total -= amount;
        Ok(remaining)
    }
}
