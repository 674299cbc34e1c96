//! Voting weight.
//!
//! Weight is the membership token's raw balance, read live from the oracle.
//! Kept as a plain `u128` so that tallies use the same checked integer
//! arithmetic as token balances.

/// Raw token balance used as voting weight.
pub type Weight = u128;
