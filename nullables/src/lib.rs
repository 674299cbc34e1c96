//! Nullable infrastructure for deterministic testing.
//!
//! Every external input the governance engine reads (the clock, the
//! membership token's balances) is abstracted behind a trait in
//! `tally-types`. This crate provides implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically, even after being handed to an engine
//! - Never touch the system clock or a real token ledger
//!
//! Usage: swap real implementations for nullables in tests and script replay.

pub mod balances;
pub mod clock;
pub mod events;

pub use balances::NullBalances;
pub use clock::NullClock;
pub use events::NullEventLog;
