//! SigLab CLI: discover instruments and write indicator/signal CSVs.
//!
//! Commands:
//! - `run`: discover symbols, fetch history, compute indicators and
//!   signals, write one CSV per symbol
//! - `symbols`: print the discovered symbol list and exit
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use siglab_core::data::{
    CircuitBreaker, DataProvider, DiscoveryError, StaticSymbols, SymbolSource, SyntheticProvider,
    Universe, UniverseFile, YahooProvider, YahooScreener,
};
use siglab_core::CsvExporter;
use siglab_runner::{
    run_batch, BatchSummary, PipelineProgress, ProviderKind, RunConfig, RunError, SourceConfig,
    SymbolError, SymbolReport,
};

#[derive(Parser)]
#[command(
    name = "siglab",
    about = "SigLab CLI: moving-average, Bollinger and RSI signals for crypto instruments"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover symbols and write one indicator/signal CSV per symbol.
    Run {
        /// Path to a TOML run config. Flags below override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Start date (YYYY-MM-DD). Defaults to 2000-01-01.
        #[arg(long)]
        start: Option<NaiveDate>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Process only the first N discovered symbols. Defaults to 5.
        #[arg(long)]
        max_symbols: Option<usize>,

        /// Directory for the CSV files. Defaults to the current directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Read symbols from a universe TOML file instead of the Yahoo listing.
        #[arg(long, conflicts_with = "symbols")]
        universe: Option<PathBuf>,

        /// Explicit symbols (e.g., BTC-USD ETH-USD).
        #[arg(long, num_args = 1..)]
        symbols: Vec<String>,

        /// Use deterministic synthetic history instead of Yahoo Finance.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Process symbols in parallel.
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Worker threads for --parallel.
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Print the discovered symbol list.
    Symbols {
        /// Read symbols from a universe TOML file instead of the Yahoo listing.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// Also write the list as a universe TOML file, for repeatable runs.
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            start,
            end,
            max_symbols,
            output_dir,
            universe,
            symbols,
            synthetic,
            parallel,
            workers,
        } => {
            let mut run_config = match config {
                Some(path) => RunConfig::from_file(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => RunConfig::default(),
            };
            apply_overrides(
                &mut run_config,
                Overrides {
                    start,
                    end,
                    max_symbols,
                    output_dir,
                    universe,
                    symbols,
                    synthetic,
                    parallel,
                    workers,
                },
            );
            run_config.validate().context("invalid run options")?;
            run_pipeline(&run_config)
        }
        Commands::Symbols { universe, save } => {
            let source_config = match universe {
                Some(universe_path) => SourceConfig::File { universe_path },
                None => SourceConfig::Yahoo,
            };
            run_symbols(&source_config, save.as_deref())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Command-line values that take precedence over the config file.
struct Overrides {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    max_symbols: Option<usize>,
    output_dir: Option<PathBuf>,
    universe: Option<PathBuf>,
    symbols: Vec<String>,
    synthetic: bool,
    parallel: bool,
    workers: Option<usize>,
}

fn apply_overrides(config: &mut RunConfig, o: Overrides) {
    if let Some(start) = o.start {
        config.start_date = start;
    }
    if let Some(end) = o.end {
        config.end_date = end;
    }
    if let Some(n) = o.max_symbols {
        config.max_symbols = n;
    }
    if let Some(dir) = o.output_dir {
        config.output_dir = dir;
    }
    if let Some(universe_path) = o.universe {
        config.source = SourceConfig::File { universe_path };
    } else if !o.symbols.is_empty() {
        config.source = SourceConfig::List { symbols: o.symbols };
    }
    if o.synthetic {
        config.provider = ProviderKind::Synthetic;
    }
    if o.parallel {
        config.parallel = true;
    }
    if o.workers.is_some() {
        config.workers = o.workers;
    }
}

fn build_source(
    config: &SourceConfig,
    breaker: &Arc<CircuitBreaker>,
) -> Result<Box<dyn SymbolSource>, DiscoveryError> {
    Ok(match config {
        SourceConfig::Yahoo => Box::new(YahooScreener::new(Arc::clone(breaker))?),
        SourceConfig::File { universe_path } => Box::new(UniverseFile::new(universe_path)),
        SourceConfig::List { symbols } => Box::new(StaticSymbols::new(symbols.iter().cloned())),
    })
}

fn build_provider(kind: ProviderKind, breaker: &Arc<CircuitBreaker>) -> Result<Box<dyn DataProvider>> {
    Ok(match kind {
        ProviderKind::Yahoo => Box::new(
            YahooProvider::new(Arc::clone(breaker)).context("creating Yahoo Finance client")?,
        ),
        ProviderKind::Synthetic => Box::new(SyntheticProvider::default()),
    })
}

/// Print the discovery error and exit with status 1.
fn discovery_failed(err: &DiscoveryError) -> ! {
    eprintln!("Symbol discovery failed: {err}");
    std::process::exit(1);
}

fn run_pipeline(config: &RunConfig) -> Result<()> {
    let breaker = Arc::new(CircuitBreaker::default_provider());
    let source = match build_source(&config.source, &breaker) {
        Ok(source) => source,
        Err(e) => discovery_failed(&e),
    };
    let provider = build_provider(config.provider, &breaker)?;
    let exporter = CsvExporter::new(&config.output_dir);
    tracing::info!(
        start = %config.start_date,
        end = %config.end_date,
        output_dir = %config.output_dir.display(),
        "run configured"
    );

    let summary = match run_batch(
        source.as_ref(),
        provider.as_ref(),
        &exporter,
        config,
        &StdoutProgress,
    ) {
        Ok(summary) => summary,
        Err(RunError::Discovery(e)) => discovery_failed(&e),
        Err(e) => return Err(e).context("batch run failed"),
    };

    print_summary(&summary);
    Ok(())
}

fn run_symbols(config: &SourceConfig, save: Option<&Path>) -> Result<()> {
    let breaker = Arc::new(CircuitBreaker::default_provider());
    let symbols = match build_source(config, &breaker).and_then(|source| source.discover()) {
        Ok(symbols) => symbols,
        Err(e) => discovery_failed(&e),
    };

    for symbol in &symbols {
        println!("{symbol}");
    }

    if let Some(path) = save {
        let universe = Universe {
            symbols,
            ..Universe::default()
        };
        let text = universe.to_toml()?;
        std::fs::write(path, text)
            .with_context(|| format!("writing universe file {}", path.display()))?;
        eprintln!("Universe saved to: {}", path.display());
    }
    Ok(())
}

/// Prints one line per symbol as it completes.
struct StdoutProgress;

impl PipelineProgress for StdoutProgress {
    fn on_discovered(&self, symbols: &[String]) {
        println!("Processing {} symbols: {}", symbols.len(), symbols.join(", "));
    }

    fn on_symbol_done(&self, symbol: &str, outcome: Result<&SymbolReport, &SymbolError>) {
        match outcome {
            Ok(report) => println!(
                "  [ok]   {symbol:<12} {:>6} rows -> {}",
                report.rows,
                report.path.display()
            ),
            Err(e) => println!("  [fail] {symbol:<12} {e}"),
        }
    }
}

fn print_summary(summary: &BatchSummary) {
    println!();
    println!("=== Batch Summary ===");
    println!(
        "Symbols: {} total, {} written, {} failed ({:.1}s)",
        summary.total, summary.succeeded, summary.failed, summary.elapsed_secs
    );

    if !summary.reports.is_empty() {
        println!();
        println!("{:<12} {:>6}  {:>9}  {:>9}  {:>9}", "symbol", "rows", "bo b/s", "ma b/s", "rsi b/s");
        for report in &summary.reports {
            let cells: Vec<String> = report
                .signals
                .iter()
                .map(|c| format!("{:>9}", format!("{}/{}", c.buys, c.sells)))
                .collect();
            println!("{:<12} {:>6}  {}", report.symbol, report.rows, cells.join("  "));
        }
    }

    for failure in &summary.failures {
        eprintln!("Error for {}: {}", failure.symbol, failure.error);
    }
}
