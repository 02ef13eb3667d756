//! Command Line Interface for the CLMM range keeper.
use anyhow::{Context, Result, bail};
use chrono::{TimeDelta, Utc};
use clap::{Parser, Subcommand};
use clmm_keeper_domain::entities::{PairState, Position};
use clmm_keeper_domain::token::{Address, TokenAmount, TokenId};
use clmm_keeper_execution::prelude::*;
use clmm_keeper_protocols::SecretString;
use clmm_keeper_simulation::prelude::*;
use dotenv::dotenv;
use primitive_types::U256;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Wallet used by the paper ledger.
const PAPER_ACCOUNT: &str = "0x00000000000000000000000000000000000000aa";

#[derive(Parser)]
#[command(name = "clmm-keeper")]
#[command(about = "Two-sided concentrated liquidity range keeper", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the keeper against a simulated pool
    Paper {
        /// Keeper config file
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,

        /// Starting pool tick
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        start_tick: i32,

        /// Standard deviation of each price step, in ticks
        #[arg(long, default_value_t = 25.0)]
        volatility: f64,

        /// Seed for a reproducible price walk
        #[arg(long)]
        seed: Option<u64>,

        /// Replay ticks from a JSON array file instead of a random walk
        #[arg(long)]
        replay: Option<PathBuf>,

        /// Starting wallet balance of token0, raw units
        #[arg(long, default_value_t = 1_000_000_000_000_000_000)]
        balance0: u128,

        /// Starting wallet balance of token1, raw units
        #[arg(long, default_value_t = 1_000_000_000_000_000_000)]
        balance1: u128,
    },
    /// Evaluate the rebalance policy once and print the action
    Evaluate {
        /// Current pool tick
        #[arg(long, allow_hyphen_values = true)]
        current_tick: i32,

        /// Open position as LOWER:UPPER; repeat for each position
        #[arg(long = "position", value_parser = parse_range, allow_hyphen_values = true)]
        positions: Vec<(i32, i32)>,

        /// Seconds since the positions were added
        #[arg(long)]
        age_secs: Option<i64>,

        /// Keeper config file for the policy parameters
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Load, validate and print a config file
    CheckConfig {
        /// Keeper config file
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,
    },
}

fn parse_range(raw: &str) -> Result<(i32, i32), String> {
    let (lower, upper) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected LOWER:UPPER, got {raw:?}"))?;
    let lower = lower
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("invalid lower tick {lower:?}: {e}"))?;
    let upper = upper
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("invalid upper tick {upper:?}: {e}"))?;
    if lower >= upper {
        return Err(format!("lower tick {lower} must be below upper tick {upper}"));
    }
    Ok((lower, upper))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Paper {
            config,
            start_tick,
            volatility,
            seed,
            replay,
            balance0,
            balance1,
        } => {
            let path = match replay {
                Some(file) => TickSource::Replay(load_ticks(&file)?),
                None => TickSource::Walk { volatility, seed },
            };
            run_paper(&config, start_tick, path, balance0, balance1).await?
        }
        Commands::Evaluate {
            current_tick,
            positions,
            age_secs,
            config,
        } => run_evaluate(current_tick, &positions, age_secs, config.as_deref())?,
        Commands::CheckConfig { config } => {
            let config = KeeperConfig::load(&config)
                .with_context(|| format!("invalid config {}", config.display()))?;
            println!("✅ Config is valid");
            println!("{config:#?}");
        }
    }

    Ok(())
}

/// Where paper mode takes its price moves from.
enum TickSource {
    Walk { volatility: f64, seed: Option<u64> },
    Replay(Vec<i32>),
}

fn load_ticks(path: &Path) -> Result<Vec<i32>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let ticks: Vec<i32> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of ticks", path.display()))?;
    if ticks.is_empty() {
        bail!("{} holds no ticks", path.display());
    }
    Ok(ticks)
}

async fn run_paper(
    path: &Path,
    start_tick: i32,
    source: TickSource,
    balance0: u128,
    balance1: u128,
) -> Result<()> {
    if let TickSource::Walk { volatility, .. } = source
        && !(volatility.is_finite() && volatility >= 0.0)
    {
        bail!("volatility must be a non-negative number, got {volatility}");
    }

    let mut config = KeeperConfig::from_file(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    config.apply_env(|key| std::env::var(key).ok());
    // Nothing is signed on the paper ledger.
    if config.credentials.private_key.is_empty() {
        config.credentials.private_key = SecretString::new("paper");
    }
    config.validate()?;

    let account = Address::parse(PAPER_ACCOUNT)?;
    let ledger = SimulatedLedger::shared(
        SimulatedLedgerConfig::new(
            account,
            config.token0.clone(),
            config.token1.clone(),
            Utc::now(),
        )
        .with_clock(SimClock::wall())
        .with_tick(start_tick)
        .with_balances(
            TokenAmount(U256::from(balance0)),
            TokenAmount(U256::from(balance1)),
        ),
    );

    let step = config.runtime.poll_interval();
    println!("📈 Paper trading {}/{}", config.token0, config.token1);
    let driver = match source {
        TickSource::Walk { volatility, seed } => {
            println!("   start tick {start_tick}, volatility {volatility} ticks, Ctrl-C to stop");
            let walk = GaussianTickWalk::new(start_tick, volatility, seed);
            spawn_tick_driver(ledger.clone(), walk, step)
        }
        TickSource::Replay(ticks) => {
            println!("   replaying {} ticks, Ctrl-C to stop", ticks.len());
            spawn_tick_driver(ledger.clone(), ReplayTickPath::new(ticks), step)
        }
    };

    let sink = NotificationSink::from_config(&config.notifications)?;
    let mut supervisor = Supervisor::new(SimulatedConnector::new(ledger.clone()), config, sink);
    let outcome = supervisor
        .run_until(async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
            info!("Shutdown requested");
        })
        .await;
    driver.abort();

    let (final0, final1) = ledger.balances().await;
    let positions = ledger.positions().await;
    let events = ledger.events().await;
    println!("\n📊 Paper session summary");
    println!("   sessions:        {}", supervisor.sessions());
    println!("   final tick:      {}", ledger.tick().await);
    println!("   blocks mined:    {}", ledger.block_number().await);
    println!("   settled events:  {}", events.len());
    println!(
        "   reverts:         {}",
        events.iter().filter(|e| e.is_revert()).count()
    );
    println!("   wallet token0:   {final0}");
    println!("   wallet token1:   {final1}");
    for position in &positions {
        println!("   position {}:  {}", position.token_id, position.range());
    }

    outcome?;
    Ok(())
}

fn run_evaluate(
    current_tick: i32,
    ranges: &[(i32, i32)],
    age_secs: Option<i64>,
    config_path: Option<&Path>,
) -> Result<()> {
    let (policy, token0, token1) = match config_path {
        Some(path) => {
            let config = KeeperConfig::from_file(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            (config.policy, config.token0, config.token1)
        }
        None => (
            PolicyConfig::default(),
            Address::parse(&format!("0x{:040x}", 0))?,
            Address::parse(&format!("0x{:040x}", 1))?,
        ),
    };

    let positions = ranges
        .iter()
        .enumerate()
        .map(|(i, (lower, upper))| Position::new(TokenId::from(i as u64 + 1), *lower, *upper))
        .collect::<Result<Vec<_>, _>>()?;

    let now = Utc::now();
    let last_add = match age_secs {
        Some(secs) => Some(
            TimeDelta::try_seconds(secs)
                .map(|age| now - age)
                .context("age is out of range")?,
        ),
        None => None,
    };

    let state = PairState::new(token0, token1, current_tick, positions, last_add);
    let action = RebalancePolicy::new(policy).evaluate(&state, now);
    println!("{}", serde_json::to_string_pretty(&action)?);
    Ok(())
}
