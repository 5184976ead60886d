//! Station keeper
//!
//! Claims weather-station rewards, sells them through a DEX aggregator, and
//! relays station telemetry to a public weather network.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────── station-keeper ─────────────────────────┐
//!                 │                                                                  │
//!   rewards API ──┼─▶ rewards ──┐                                                    │
//!                 │             ▼                                                    │
//!                 │      orchestrator::ClaimAndSwap ──▶ blockchain ──────────────────┼──▶ EVM node
//!                 │             │  ▲                                                 │
//!   aggregator ◀──┼──── swap ◀──┘  └── notify ─────────────────────────────────────┼──▶ Telegram
//!                 │                                                                  │
//!   telemetry ────┼─▶ station::StationPoller ──▶ station::publish ───────────────────┼──▶ upload endpoint
//!                 │                                                                  │
//!                 │  lifecycle (scheduler, shutdown)   config   observability        │
//!                 └──────────────────────────────────────────────────────────────────┘
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use station_keeper::blockchain::{BlockchainClient, ChainClient, EvmChain, Wallet};
use station_keeper::config::{read_config, validate_config, ConfigError, KeeperConfig};
use station_keeper::lifecycle::{signals, Job, JobRunner, Shutdown, TickOutcome};
use station_keeper::notify::{Notifier, TelegramNotifier};
use station_keeper::observability::{logging, metrics};
use station_keeper::orchestrator::{ClaimAndSwap, PipelineSettings};
use station_keeper::rewards::HttpRewardsLedger;
use station_keeper::station::{
    CredentialStore, StationCredential, StationPoller, WeatherXmClient, WundergroundUploader,
};
use station_keeper::swap::ParaswapClient;

type BoxError = Box<dyn std::error::Error>;

#[derive(Debug, Parser)]
#[command(name = "station-keeper", version, about)]
struct Cli {
    /// TOML configuration file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
enum Command {
    /// Run every enabled job on its interval until interrupted (default).
    Run,
    /// Run claim-and-swap once and exit.
    Claim,
    /// Poll and upload station telemetry once and exit.
    Poll,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Run);

    let mut config = read_config(cli.config.as_deref())?;
    match command {
        Command::Run => {}
        Command::Claim => {
            config.schedule.claim_enabled = true;
            config.schedule.poll_enabled = false;
        }
        Command::Poll => {
            config.schedule.claim_enabled = false;
            config.schedule.poll_enabled = true;
        }
    }

    logging::init_tracing(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), command = ?command, "station-keeper starting");

    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            tracing::error!(%error, "Invalid configuration");
        }
        return Err(ConfigError::Validation(errors).into());
    }

    if config.observability.metrics_enabled {
        let addr: std::net::SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let jobs = build_jobs(&config).await?;

    match command {
        Command::Run => run_scheduled(jobs, &config).await,
        Command::Claim | Command::Poll => run_single(jobs).await,
    }
}

async fn build_jobs(config: &KeeperConfig) -> Result<Vec<JobRunner>, BoxError> {
    let mut jobs = Vec::new();

    if config.schedule.claim_enabled {
        let job = claim_and_swap(config).await?;
        jobs.push(JobRunner::new(
            job,
            Duration::from_secs(config.schedule.claim_interval_secs),
        ));
    }

    if config.schedule.poll_enabled {
        let job = station_poller(config)?;
        jobs.push(JobRunner::new(
            job,
            Duration::from_secs(config.schedule.poll_interval_secs),
        ));
    }

    Ok(jobs)
}

async fn claim_and_swap(config: &KeeperConfig) -> Result<Arc<dyn Job>, BoxError> {
    let wallet = Wallet::from_env(config.chain.chain_id)?;
    let sender = wallet.address();

    let client = BlockchainClient::new(config.chain.clone()).await?;
    let chain: Arc<dyn ChainClient> = Arc::new(EvmChain::new(client, wallet));

    let ledger = Arc::new(HttpRewardsLedger::new(&config.rewards)?);
    let aggregator = Arc::new(
        ParaswapClient::new(&config.aggregator, config.chain.chain_id, sender)?
            .with_decimals(config.claim.source_decimals, config.claim.destination_decimals),
    );

    let notifier = TelegramNotifier::from_config(&config.notifier)?
        .map(|notifier| Arc::new(notifier) as Arc<dyn Notifier>);
    if notifier.is_none() {
        if config.notifier.bot_token.is_some() || config.notifier.chat_id.is_some() {
            tracing::warn!("Only one of bot_token and chat_id is set, swap notifications disabled");
        } else {
            tracing::info!("Telegram credentials not set, swap notifications disabled");
        }
    }

    tracing::info!(
        sender = %sender,
        receiver = %config.claim.receiver.unwrap_or(sender),
        claim_contract = %config.claim.contract_address,
        source_token = %config.claim.source_token,
        destination_token = %config.claim.destination_token,
        "Claim-and-swap configured"
    );

    Ok(Arc::new(ClaimAndSwap::new(
        PipelineSettings::from_config(config),
        ledger,
        chain,
        aggregator,
        notifier,
    )))
}

fn station_poller(config: &KeeperConfig) -> Result<Arc<dyn Job>, BoxError> {
    let credentials = Arc::new(CredentialStore::new(StationCredential::new(
        config.station.access_token.as_str(),
        config.station.refresh_token.as_str(),
    )));
    let source = Arc::new(WeatherXmClient::new(&config.station)?);
    let sink = Arc::new(WundergroundUploader::new(&config.upload)?);

    tracing::info!(
        device_id = %config.station.device_id,
        station_id = %config.upload.station_id,
        "Station relay configured"
    );

    Ok(Arc::new(StationPoller::new(
        source,
        sink,
        credentials,
        Duration::from_secs(config.station.refresh_backoff_secs),
    )))
}

async fn run_scheduled(jobs: Vec<JobRunner>, config: &KeeperConfig) -> Result<(), BoxError> {
    if jobs.is_empty() {
        tracing::warn!("No jobs enabled, exiting");
        return Ok(());
    }

    let shutdown = Shutdown::new();
    let tasks = jobs
        .into_iter()
        .map(|runner| tokio::spawn(runner.run(shutdown.subscribe())))
        .collect::<Vec<_>>();

    signals::shutdown_signal().await;
    tracing::info!("Shutting down, waiting for in-flight runs");

    // Long enough for a swap awaiting confirmation to settle.
    let grace = Duration::from_secs(config.chain.confirmation_timeout_secs);
    shutdown.drain(tasks, grace).await;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn run_single(jobs: Vec<JobRunner>) -> Result<(), BoxError> {
    for runner in jobs {
        if runner.tick().await == TickOutcome::Failed {
            return Err(format!("{} run failed", runner.name()).into());
        }
    }
    Ok(())
}
