//! Shared utilities for the tally workspace.

pub mod logging;
pub mod time;

pub use logging::{init_logging, LogFormat};
pub use time::{describe_deadline, format_duration};
