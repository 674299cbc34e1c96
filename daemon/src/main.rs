//! tally daemon: entry point for replaying governance scripts.

mod config;
mod script;

use anyhow::Context;
use clap::Parser;
use config::{DaemonConfig, Overrides};
use script::{Replay, Script};
use std::io::Write;
use std::path::PathBuf;
use tally_utils::LogFormat;

#[derive(Parser)]
#[command(name = "tally-daemon", about = "Token-weighted governance queue")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "TALLY_CONFIG")]
    config: Option<PathBuf>,

    /// Identity of the membership token (the only caller allowed to remove votes).
    #[arg(long, env = "TALLY_TOKEN_ADDRESS")]
    token_address: Option<String>,

    /// Voting period in seconds, added to every proposal deadline.
    #[arg(long, env = "TALLY_VOTING_PERIOD_SECS")]
    voting_period_secs: Option<u64>,

    /// Log format: "human" or "json".
    #[arg(long, env = "TALLY_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "TALLY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Replay a script of governance operations and print every event and
    /// query result as a JSON line.
    Replay {
        /// Path to the TOML script.
        #[arg(long)]
        script: PathBuf,

        /// Abort on the first rejected operation instead of reporting it.
        #[arg(long)]
        strict: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config = cli
        .config
        .as_deref()
        .map(DaemonConfig::from_toml_file)
        .transpose()?;
    let config = DaemonConfig::resolve(
        file_config,
        Overrides {
            token_address: cli.token_address,
            voting_period_secs: cli.voting_period_secs,
            log_format: cli.log_format,
            log_level: cli.log_level,
        },
    )?;

    tally_utils::init_logging(config.logging.format, &config.logging.level);
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Command::Replay { script, strict } => {
            let parsed = Script::from_toml_file(&script)?;
            tracing::info!(
                "Replaying {} steps from {} (voting period {}, token {})",
                parsed.steps.len(),
                script.display(),
                tally_utils::format_duration(config.governance.voting_period_secs),
                config.governance.token_address,
            );

            let mut replay = Replay::new(config.governance)?;
            let lines = replay.run(&parsed, strict)?;

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for line in &lines {
                serde_json::to_writer(&mut out, line).context("failed to encode output")?;
                writeln!(out)?;
            }
        }
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
