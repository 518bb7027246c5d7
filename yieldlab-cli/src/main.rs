//! YieldLab CLI — dividend profile and comparison commands.
//!
//! Commands:
//! - `profile` — analyse one ticker: yields, drawdowns, volatility, normality
//! - `compare` — analyse several tickers and pivot the results side by side
//!
//! Settings come from an optional TOML file (`--config`); flags override it.

mod visualize;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use yieldlab_core::{DividendAsset, Visualizer};
use yieldlab_runner::export::{
    comparison_markdown, export_comparison_csv, export_comparison_json, export_pivot_csv,
    export_profile_json, profile_markdown, save_artifacts,
};
use yieldlab_runner::{AssetComparisonAggregator, ComparisonConfig, ProviderKind};

use crate::visualize::TextVisualizer;

#[derive(Parser)]
#[command(
    name = "yieldlab",
    about = "YieldLab CLI — dividend yield, drawdown and volatility analysis"
)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    /// Log at debug level (RUST_LOG overrides).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a single ticker.
    Profile {
        /// Ticker symbol (e.g., SPYD).
        ticker: String,
    },
    /// Compare several tickers side by side.
    Compare {
        /// Ticker symbols. Defaults to the config file's list.
        tickers: Vec<String>,

        /// Abort on the first ticker that fails.
        #[arg(long, default_value_t = false)]
        strict: bool,

        /// Also write JSON, CSV and Markdown artifacts under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

#[derive(Args)]
struct Settings {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Market data provider.
    #[arg(long, global = true, value_enum)]
    provider: Option<ProviderArg>,

    /// Directory of `<TICKER>_prices.csv` / `<TICKER>_dividends.csv` files.
    #[arg(long, global = true)]
    csv_dir: Option<PathBuf>,

    /// Significance level for the normality tests.
    #[arg(long, global = true)]
    alpha: Option<f64>,

    /// Payments a year must contain to count toward annual yield.
    #[arg(long, global = true)]
    periods_per_year: Option<usize>,

    /// Render a histogram and Q-Q table for each annual series.
    #[arg(long, global = true, default_value_t = false)]
    plot: bool,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = Format::Table)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderArg {
    Yahoo,
    Csv,
    Synthetic,
}

impl From<ProviderArg> for ProviderKind {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Yahoo => ProviderKind::Yahoo,
            ProviderArg::Csv => ProviderKind::Csv,
            ProviderArg::Synthetic => ProviderKind::Synthetic,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Json,
    Csv,
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "yieldlab_core=debug,yieldlab_runner=debug,yieldlab=debug"
    } else {
        "yieldlab_core=warn,yieldlab_runner=info,yieldlab=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Profile { ticker } => {
            let config = resolve_config(&cli.settings, vec![ticker], false)?;
            run_profile(&config, cli.settings.format)
        }
        Commands::Compare {
            tickers,
            strict,
            output_dir,
        } => {
            let config = resolve_config(&cli.settings, tickers, strict)?;
            run_compare(&config, cli.settings.format, output_dir)
        }
    }
}

/// Load the config file (if any) and apply command-line overrides.
fn resolve_config(
    settings: &Settings,
    tickers: Vec<String>,
    strict: bool,
) -> Result<ComparisonConfig> {
    let mut config = match &settings.config {
        Some(path) => ComparisonConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ComparisonConfig::default(),
    };

    if !tickers.is_empty() {
        config.tickers = tickers;
    }
    config.strict |= strict;
    if let Some(kind) = settings.provider {
        config.provider.kind = kind.into();
    }
    if let Some(dir) = &settings.csv_dir {
        config.provider.csv_dir = Some(dir.clone());
        if settings.provider.is_none() {
            config.provider.kind = ProviderKind::Csv;
        }
    }
    if let Some(alpha) = settings.alpha {
        config.analysis.alpha = alpha;
    }
    if let Some(periods) = settings.periods_per_year {
        config.analysis.periods_per_year = periods;
    }
    config.analysis.plot |= settings.plot;

    config.validate()?;
    Ok(config)
}

fn run_profile(config: &ComparisonConfig, format: Format) -> Result<()> {
    let provider = config.provider.build()?;
    let ticker = &config.tickers[0];
    let viz = TextVisualizer;
    let visualizer: Option<&dyn Visualizer> = Some(&viz);

    info!(ticker, provider = provider.name(), "profiling");
    let asset = DividendAsset::fetch(ticker, provider.as_ref(), &config.analysis, visualizer)
        .with_context(|| format!("failed to profile {ticker}"))?;

    match format {
        Format::Table => print!("{}", profile_markdown(&asset)),
        Format::Json => println!("{}", export_profile_json(asset.profile())?),
        Format::Csv => {
            let single = AssetComparisonAggregator::from_assets(vec![asset]);
            print!("{}", export_pivot_csv(&single.aggregate_annual_yields())?);
        }
    }
    Ok(())
}

fn run_compare(
    config: &ComparisonConfig,
    format: Format,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let provider = config.provider.build()?;
    let viz = TextVisualizer;
    let visualizer: Option<&dyn Visualizer> = Some(&viz);

    info!(
        tickers = config.tickers.len(),
        provider = provider.name(),
        strict = config.strict,
        "comparing"
    );
    let comparison = AssetComparisonAggregator::new(
        &config.tickers,
        provider.as_ref(),
        &config.analysis,
        config.strict,
        visualizer,
    )?;

    for failure in comparison.failures() {
        eprintln!("Skipped {}: {}", failure.ticker, failure.error);
    }
    if comparison.assets().is_empty() {
        bail!("no ticker could be analysed");
    }

    let table = comparison.comparison_table();
    match format {
        Format::Table => print!("{}", comparison_markdown(&comparison)),
        Format::Json => println!("{}", export_comparison_json(&table)?),
        Format::Csv => print!("{}", export_comparison_csv(&table)?),
    }

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&comparison, &dir)?;
        eprintln!("Artifacts written to {}", run_dir.display());
    }
    Ok(())
}
