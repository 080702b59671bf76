//! SAVAGE arena trader: autonomous betting agent for arena matches.
//!
//! Entry point. Loads configuration, applies command-line overrides,
//! initialises structured logging, wires the arena (and optional Bankr)
//! collaborators, and runs the poll loop until a stop rule fires or the
//! operator interrupts.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use secrecy::SecretString;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use arena_trader::config::{AppConfig, Overrides};
use arena_trader::engine::{CycleOutcome, Executor, Session, Trader};
use arena_trader::platforms::arena::ArenaClient;
use arena_trader::platforms::bankr::BankrClient;
use arena_trader::platforms::BalanceSource;
use arena_trader::strategy::{KellyCalculator, RiskManager};

const BANNER: &str = r#"
   _____ ___ _   __ ___   ___ ___
  / __/ _ | | / / _ |/ __/ __|
 _\ \/ __ | |/ / __ / (_ / _|
/___/_/ |_|___/_/ |_\___/___|   ARENA TRADER

  Team composition analysis + fractional Kelly
  v0.1.0 — Autonomous Agent
"#;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Arena base URL
    #[arg(long, env = "SAVAGE_ARENA_URL")]
    arena_url: Option<String>,

    /// Bankr API key; enables the transaction proxy as balance source
    #[arg(long, env = "BANKR_API_KEY", hide_env_values = true)]
    bankr_key: Option<String>,

    /// Minimum win probability to bet (0-1)
    #[arg(long)]
    min_confidence: Option<f64>,

    /// Maximum wager as a fraction of bankroll (0-1)
    #[arg(long)]
    max_wager: Option<f64>,

    /// Kelly multiplier (0-1)
    #[arg(long)]
    kelly: Option<f64>,

    /// Minimum wager amount
    #[arg(long)]
    min_bet: Option<f64>,

    /// Stop after losing this fraction of the starting balance (0-1)
    #[arg(long)]
    stop_loss: Option<f64>,

    /// Log wagers without placing them
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            arena_url: self.arena_url.clone(),
            min_confidence: self.min_confidence,
            max_wager_pct: self.max_wager,
            kelly_fraction: self.kelly,
            min_wager: self.min_bet,
            stop_loss_pct: self.stop_loss,
            dry_run: self.dry_run,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();

    init_logging();

    let mut cfg = AppConfig::load(&cli.config)?;
    cfg.apply_overrides(&cli.overrides());
    cfg.validate()?;

    println!("{BANNER}");
    info!(
        agent_name = %cfg.agent.name,
        arena = %cfg.arena.base_url,
        min_confidence = format!("{:.0}%", cfg.risk.min_confidence * 100.0),
        max_wager = format!("{:.0}%", cfg.risk.max_wager_pct * 100.0),
        kelly = cfg.risk.kelly_fraction,
        stop_loss = format!("{:.0}%", cfg.risk.stop_loss_pct * 100.0),
        dry_run = cfg.agent.dry_run,
        "Arena trader starting up"
    );

    // -- Initialise components -------------------------------------------

    let arena = ArenaClient::new(&cfg.arena.base_url, cfg.request_timeout(), &cfg.agent.currency)?;
    let balances = balance_source(&cli, &cfg, &arena)?;

    let session = Session::new(
        cfg.risk.evaluator(),
        KellyCalculator::new(cfg.risk.kelly()),
        RiskManager::new(cfg.risk.stop_rules()),
        cfg.risk.max_result_attempts,
    );
    let executor = Executor::new(Box::new(arena.clone()), cfg.agent.dry_run);
    let mut trader = Trader::new(
        Box::new(arena),
        balances,
        executor,
        session,
        &cfg.agent.currency,
    );

    // -- Main loop -------------------------------------------------------

    let mut interval = tokio::time::interval(cfg.poll_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        interval_secs = cfg.agent.poll_interval_secs,
        "Entering main loop. Press Ctrl+C to stop."
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let CycleOutcome::Stop(reason) = trader.run_once().await {
                    warn!(reason = %reason, "Stop condition reached. Shutting down.");
                    break;
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    trader.log_summary();
    info!("Arena trader shut down cleanly.");

    Ok(())
}

/// Bankr when a key is available and the proxy is enabled (or a key was
/// given explicitly); the arena's own balance endpoint otherwise.
fn balance_source(cli: &Cli, cfg: &AppConfig, arena: &ArenaClient) -> Result<Box<dyn BalanceSource>> {
    let key = match &cli.bankr_key {
        Some(k) => Some(SecretString::new(k.clone())),
        None if cfg.proxy.enabled => match AppConfig::resolve_secret(&cfg.proxy.api_key_env) {
            Ok(k) => Some(k),
            Err(e) => {
                warn!(error = %e, "Proxy enabled but no API key, using arena balance");
                None
            }
        },
        None => None,
    };

    match key {
        Some(key) => {
            info!(base_url = %cfg.proxy.base_url, "Using Bankr for balance checks");
            Ok(Box::new(BankrClient::new(
                &cfg.proxy.base_url,
                key,
                &cfg.agent.currency,
                cfg.proxy.max_wait(),
                cfg.proxy.poll_every(),
            )?))
        }
        None => Ok(Box::new(arena.clone())),
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("arena_trader=info"));

    let json_logging = std::env::var("ARENA_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
