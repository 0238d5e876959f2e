//! `waterspout` - CPU capability report and cross-tier verification.

mod probe;
mod verify;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use waterspout_core::config::DEFAULT_CONFIG_FILE;
use waterspout_core::{DispatchConfig, Engine, TierSelector, WaterspoutConfig};

/// Waterspout - runtime SIMD tier dispatch diagnostics
#[derive(Parser, Debug)]
#[command(name = "waterspout")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (a missing file means defaults)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE, env = "WATERSPOUT_CONFIG")]
    config: PathBuf,

    /// Log filter, overriding the configured level (RUST_LOG still wins)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report CPU features and the tier the dispatcher would select
    Probe {
        /// Tier to force ("auto", "avx2", "sse2", "fpu", ...)
        #[arg(long)]
        tier: Option<TierSelector>,

        /// Fail instead of downgrading when the forced tier is not compiled in
        #[arg(long)]
        no_fallback: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare every operation on the selected tier against the scalar engine
    Verify {
        /// Tier to force ("auto", "avx2", "sse2", "fpu", ...)
        #[arg(long)]
        tier: Option<TierSelector>,

        /// Elements per buffer
        #[arg(long, default_value_t = verify::DEFAULT_SIZE)]
        size: usize,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Applies command-line overrides on top of the `[dispatch]` section.
fn dispatch_config(base: &DispatchConfig, tier: Option<TierSelector>, no_fallback: bool) -> DispatchConfig {
    DispatchConfig {
        tier: tier.unwrap_or(base.tier),
        allow_fallback: base.allow_fallback && !no_fallback,
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = WaterspoutConfig::load_from(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    init_tracing(cli.log_level.as_deref().unwrap_or(&config.logging.level));
    tracing::debug!(config = ?config, "Configuration loaded");

    match cli.command {
        Commands::Probe {
            tier,
            no_fallback,
            json,
        } => {
            let dispatch = dispatch_config(&config.dispatch, tier, no_fallback);
            let engine = Engine::from_config(&dispatch)?;
            let report = probe::ProbeReport::new(dispatch.tier, &engine);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                probe::print(&report);
            }
        }
        Commands::Verify { tier, size } => {
            let dispatch = dispatch_config(&config.dispatch, tier, false);
            let engine = Engine::from_config(&dispatch)?;
            let checks = verify::run(&engine, size)?;
            verify::print(&engine, size, &checks);
            let failed = checks.iter().filter(|c| !c.passed()).count();
            if failed > 0 {
                anyhow::bail!("{failed} of {} checks failed on {}", checks.len(), engine.name());
            }
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }
    Ok(())
}
