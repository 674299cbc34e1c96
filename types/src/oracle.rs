//! The voting-weight oracle capability.

use crate::{Address, Weight};

/// Live balance lookup against the membership token.
///
/// Queried synchronously at the moment of each governance call; no snapshot
/// is taken, so the same holder may report different weights across calls.
pub trait WeightOracle {
    fn balance_of(&self, holder: &Address) -> Weight;
}

impl<O: WeightOracle + ?Sized> WeightOracle for &O {
    fn balance_of(&self, holder: &Address) -> Weight {
        (**self).balance_of(holder)
    }
}
