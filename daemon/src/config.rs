//! Daemon configuration: a TOML file with `[governance]` and `[logging]`
//! tables, overridden by CLI flags and environment variables.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tally_governance::{GovernanceConfig, DEFAULT_VOTING_PERIOD_SECS};
use tally_utils::LogFormat;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonConfig {
    pub governance: GovernanceConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "human" or "json".
    #[serde(default)]
    pub format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: default_log_level(),
        }
    }
}

/// Settings that may come from the command line, each overriding the file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub token_address: Option<String>,
    pub voting_period_secs: Option<u64>,
    pub log_format: Option<LogFormat>,
    pub log_level: Option<String>,
}

impl DaemonConfig {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("failed to parse daemon config")?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("failed to serialize daemon config")
    }

    /// Merge an optional file config with command-line overrides.
    ///
    /// Without a file, the token address must come from the overrides.
    pub fn resolve(file: Option<Self>, overrides: Overrides) -> anyhow::Result<Self> {
        let mut config = match file {
            Some(cfg) => cfg,
            None => {
                let token = overrides.token_address.clone().context(
                    "no config file given: --token-address (or TALLY_TOKEN_ADDRESS) is required",
                )?;
                Self {
                    governance: GovernanceConfig::new(token, DEFAULT_VOTING_PERIOD_SECS),
                    logging: LoggingConfig::default(),
                }
            }
        };
        if let Some(token) = overrides.token_address {
            config.governance.token_address = token.into();
        }
        if let Some(period) = overrides.voting_period_secs {
            config.governance.voting_period_secs = period;
        }
        if let Some(format) = overrides.log_format {
            config.logging.format = format;
        }
        if let Some(level) = overrides.log_level {
            config.logging.level = level;
        }
        config.governance.validate()?;
        Ok(config)
    }
}
