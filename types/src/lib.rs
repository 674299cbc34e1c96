//! Fundamental types for the tally governance workspace.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! caller identities, timestamps, voting weight, and the two injected
//! capabilities every governance call reads: the clock and the weight oracle.

pub mod address;
pub mod amount;
pub mod oracle;
pub mod time;

pub use address::Address;
pub use amount::Weight;
pub use oracle::WeightOracle;
pub use time::{Clock, Timestamp};
