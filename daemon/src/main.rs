//! Trappist daemon: runs an in-process devnet of the AVS.

mod chain;
mod config;
mod devnet;

use clap::Parser;
use std::path::PathBuf;
use tokio::sync::watch;
use trappist_codec::task_digest;
use trappist_types::{BlockNumber, TaskIndex};
use trappist_utils::{init_logging, LogFormat};

use crate::config::DevnetConfig;
use crate::devnet::Devnet;

#[derive(Parser)]
#[command(name = "trappist-daemon", about = "Trappist AVS devnet daemon")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "TRAPPIST_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "TRAPPIST_LOG_LEVEL")]
    log_level: Option<String>,

    /// Emit JSON log lines.
    #[arg(long, env = "TRAPPIST_LOG_JSON")]
    log_json: bool,

    /// Seconds between spammed tasks.
    #[arg(long, env = "TRAPPIST_TASK_INTERVAL")]
    task_interval: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Start the devnet and spam tasks until Ctrl-C.
    Run,
    /// Print the digest operators sign for a task.
    Digest {
        #[arg(long)]
        index: u32,
        #[arg(long)]
        payload: String,
        #[arg(long)]
        block: u64,
    },
    /// Print the default configuration as TOML.
    DefaultConfig,
}

fn load_config(cli: &Cli) -> anyhow::Result<DevnetConfig> {
    let mut config = match &cli.config {
        Some(path) => DevnetConfig::from_toml_file(path)?,
        None => DevnetConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.avs.log_level = level.clone();
    }
    if cli.log_json {
        config.avs.log_format = LogFormat::Json;
    }
    if let Some(secs) = cli.task_interval {
        config.task_interval_secs = secs;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Command::Digest {
            index,
            payload,
            block,
        } => {
            let digest = task_digest(TaskIndex::new(*index), payload, BlockNumber::new(*block));
            println!("{digest}");
        }
        Command::DefaultConfig => {
            print!("{}", DevnetConfig::default().to_toml_string()?);
        }
        Command::Run => {
            let config = load_config(&cli)?;
            init_logging(config.avs.log_format, &config.avs.log_level);
            if let Some(path) = &cli.config {
                tracing::info!("Loaded config from {}", path.display());
            }
            tracing::info!(
                service = %config.avs.service_name,
                operators = config.operators.len(),
                task_interval_secs = config.task_interval_secs,
                threshold_bps = config.avs.threshold_bps,
                "Starting Trappist devnet"
            );

            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            let devnet = Devnet::new(config)?;
            let runner = tokio::spawn(devnet.run(shutdown_rx));

            tokio::signal::ctrl_c().await?;
            tracing::info!("Shutdown signal received, stopping devnet");
            shutdown_tx.send(true)?;
            runner.await??;

            tracing::info!("Trappist daemon exited cleanly");
        }
    }

    Ok(())
}
