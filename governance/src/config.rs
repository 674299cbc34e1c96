//! Governance configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tally_types::Address;

use crate::GovernanceError;

/// Construction-time settings for a [`QueueEngine`](crate::QueueEngine).
///
/// Can be loaded from a TOML file via [`GovernanceConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Fixed voting period added to every deadline.
    #[serde(default = "default_voting_period_secs")]
    pub voting_period_secs: u64,

    /// Identity of the membership token; the only caller allowed to remove votes.
    pub token_address: Address,
}

/// One week.
pub const DEFAULT_VOTING_PERIOD_SECS: u64 = 7 * 24 * 60 * 60;

fn default_voting_period_secs() -> u64 {
    DEFAULT_VOTING_PERIOD_SECS
}

impl GovernanceConfig {
    pub fn new(token_address: impl Into<Address>, voting_period_secs: u64) -> Self {
        Self {
            voting_period_secs,
            token_address: token_address.into(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, GovernanceError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| GovernanceError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, GovernanceError> {
        let config: Self =
            toml::from_str(s).map_err(|e| GovernanceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, GovernanceError> {
        toml::to_string_pretty(self).map_err(|e| GovernanceError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), GovernanceError> {
        if self.voting_period_secs == 0 {
            return Err(GovernanceError::Config(
                "voting_period_secs must be non-zero".into(),
            ));
        }
        if self.token_address.is_unset() {
            return Err(GovernanceError::Config(
                "token_address must be set".into(),
            ));
        }
        Ok(())
    }
}
