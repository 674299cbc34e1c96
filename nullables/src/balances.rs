//! Nullable weight oracle: a programmable balance table.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tally_types::{Address, Weight, WeightOracle};

/// An in-memory membership-token balance table.
///
/// Unknown holders have a zero balance. Clones share the same table, so
/// balances can be changed after the oracle has been handed to an engine.
#[derive(Clone, Debug, Default)]
pub struct NullBalances {
    balances: Arc<Mutex<HashMap<Address, Weight>>>,
}

impl NullBalances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(holder, balance)` pairs.
    pub fn with_balances<A: Into<Address>>(entries: impl IntoIterator<Item = (A, Weight)>) -> Self {
        let table = Self::new();
        for (holder, amount) in entries {
            table.set(holder, amount);
        }
        table
    }

    /// Set a holder's balance. Zero removes the holder from the table.
    pub fn set(&self, holder: impl Into<Address>, amount: Weight) {
        let holder = holder.into();
        let mut balances = self.balances.lock().unwrap();
        if amount == 0 {
            balances.remove(&holder);
        } else {
            balances.insert(holder, amount);
        }
    }

    /// Number of holders with a non-zero balance.
    pub fn holder_count(&self) -> usize {
        self.balances.lock().unwrap().len()
    }
}

impl WeightOracle for NullBalances {
    fn balance_of(&self, holder: &Address) -> Weight {
        self.balances
            .lock()
            .unwrap()
            .get(holder)
            .copied()
            .unwrap_or(0)
    }
}
