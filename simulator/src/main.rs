//! TokenSwap Simulator
//!
//! Terminal front end for the swap calculator: an interactive form, or
//! scripted scenarios run against a live session.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tokenswap_prices::{CatalogLoader, PriceSourceConfig};
use tokenswap_session::{SessionConfig, SessionRuntime};

mod controller;
mod icons;
mod metrics;
mod render;
mod scenario;

use controller::{OutputMode, SwapController};
use icons::{IconConfig, IconResolver};
use scenario::Scenario;

/// TokenSwap Simulator CLI
#[derive(Parser, Debug)]
#[command(name = "swap-simulator")]
#[command(about = "Currency swap calculator in the terminal")]
struct Args {
    /// Price feed URL
    #[arg(long)]
    prices_url: Option<String>,

    /// Read prices from a local JSON file instead of the feed
    #[arg(long)]
    prices_file: Option<PathBuf>,

    /// Price request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Scenario to run (built-in name or path to a .json file)
    #[arg(short, long)]
    scenario: Option<String>,

    /// List built-in scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Random seed for reproducible submission delays
    #[arg(long)]
    seed: Option<u64>,

    /// Shortest simulated submission delay in milliseconds
    #[arg(long)]
    min_delay_ms: Option<u64>,

    /// Longest simulated submission delay in milliseconds
    #[arg(long)]
    max_delay_ms: Option<u64>,

    /// Print snapshots as JSON lines instead of the form
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Base URL for token icons
    #[arg(long)]
    icon_base_url: Option<String>,

    /// Icon shown when a token icon is missing
    #[arg(long)]
    icon_fallback_url: Option<String>,

    /// Check icon URLs and substitute the fallback for missing ones
    #[arg(long)]
    check_icons: bool,
}

impl Args {
    fn price_config(&self) -> PriceSourceConfig {
        let mut config = PriceSourceConfig::from_env();
        if let Some(url) = &self.prices_url {
            config.url = url.clone();
        }
        if let Some(path) = &self.prices_file {
            config.prices_file = Some(path.clone());
        }
        if let Some(ms) = self.timeout_ms {
            config.request_timeout = Some(Duration::from_millis(ms));
        }
        config
    }

    fn session_config(&self) -> SessionConfig {
        let mut config = SessionConfig::from_env();
        if let Some(seed) = self.seed {
            config.submission.seed = Some(seed);
        }
        if let Some(ms) = self.min_delay_ms {
            config.submission.min_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.max_delay_ms {
            config.submission.max_delay = Duration::from_millis(ms);
        }
        config
    }

    fn icon_config(&self) -> IconConfig {
        let mut config = IconConfig::from_env();
        if let Some(url) = &self.icon_base_url {
            config.base_url = url.clone();
        }
        if let Some(url) = &self.icon_fallback_url {
            config.fallback_url = url.clone();
        }
        config.probe = self.check_icons;
        config
    }
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
    );
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_json);

    if args.list_scenarios {
        for name in Scenario::builtin_names() {
            println!("{name}");
        }
        return Ok(());
    }

    let price_config = args.price_config();
    price_config.validate().map_err(anyhow::Error::msg)?;
    let session_config = args.session_config();
    session_config.validate().map_err(anyhow::Error::msg)?;
    let icon_config = args.icon_config();
    icon_config.validate().map_err(anyhow::Error::msg)?;

    let scenario = args.scenario.as_deref().map(Scenario::load).transpose()?;

    info!("Starting TokenSwap Simulator");

    let loader = CatalogLoader::new(price_config.build_source());
    info!(source = loader.source_name(), "Loading prices");

    let handle = SessionRuntime::spawn(session_config, loader);
    let mode = if args.json {
        OutputMode::Json
    } else {
        OutputMode::Form
    };
    let controller = SwapController::new(handle, IconResolver::new(icon_config), mode);

    controller.wait_ready().await?;

    let passed = match &scenario {
        Some(scenario) => controller.run_scenario(scenario).await?,
        None => {
            info!("Running in interactive mode");
            tokio::select! {
                result = controller.run_interactive() => result?,
                _ = tokio::signal::ctrl_c() => info!("Interrupted"),
            }
            true
        }
    };

    info!("Simulation complete: {}", controller.summary());
    controller.shutdown().await?;

    if !passed {
        anyhow::bail!("Scenario expectations failed");
    }

    Ok(())
}
