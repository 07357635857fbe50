//! Batch orchestration: discover, then fetch → indicators → signals → export
//! for each instrument.
//!
//! Discovery failure aborts the run. Anything that goes wrong for a single
//! instrument is logged, recorded in the summary, and the batch moves on.
//! Per-instrument pipelines share nothing mutable, so they may run on a rayon
//! pool; the summary lists instruments in discovery order either way.

use std::path::PathBuf;
use std::time::Instant;

use chrono::NaiveDate;
use rayon::prelude::*;
use thiserror::Error;

use siglab_core::data::{normalize_bars, DataError, DataProvider, DiscoveryError, SymbolSource};
use siglab_core::domain::is_strictly_ascending;
use siglab_core::signals::count_signals;
use siglab_core::{
    compute_indicators, compute_strategies, ExportError, Exporter, SeriesError,
};

use crate::config::{ConfigError, RunConfig};

/// Errors that stop the whole run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("symbol discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Errors confined to one instrument.
#[derive(Debug, Error)]
pub enum SymbolError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] DataError),
    #[error("series error: {0}")]
    Series(#[from] SeriesError),
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}

/// Buy/sell totals for one signal column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalCount {
    pub column: String,
    pub buys: usize,
    pub sells: usize,
}

/// Outcome of a successful per-instrument pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolReport {
    pub symbol: String,
    pub rows: usize,
    pub path: PathBuf,
    pub signals: Vec<SignalCount>,
    /// BLAKE3 hex digest of the written file.
    pub content_hash: String,
}

impl SymbolReport {
    pub fn signal_count(&self, column: &str) -> Option<&SignalCount> {
        self.signals.iter().find(|c| c.column == column)
    }
}

#[derive(Debug)]
pub struct SymbolFailure {
    pub symbol: String,
    pub error: SymbolError,
}

/// Result of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Instruments attempted (discovered, capped at `max_symbols`).
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub reports: Vec<SymbolReport>,
    pub failures: Vec<SymbolFailure>,
    pub elapsed_secs: f64,
}

impl BatchSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Callbacks fired as a batch advances.
///
/// `on_symbol_done` may be called from worker threads, in completion order.
pub trait PipelineProgress: Send + Sync {
    fn on_discovered(&self, _symbols: &[String]) {}
    fn on_symbol_done(&self, _symbol: &str, _outcome: Result<&SymbolReport, &SymbolError>) {}
}

/// Progress sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl PipelineProgress for NoProgress {}

/// Run the full pipeline for one instrument.
///
/// An empty history is not an error: the file is still written, header only.
/// A provider that reports itself unavailable fails fast without a request.
/// Bars that arrive out of order or with repeated dates are normalized first.
pub fn process_symbol(
    provider: &dyn DataProvider,
    exporter: &dyn Exporter,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<SymbolReport, SymbolError> {
    if !provider.is_available() {
        return Err(DataError::CircuitBreakerTripped.into());
    }
    let mut fetched = provider.fetch(symbol, start, end)?;
    if !is_strictly_ascending(&fetched.bars) {
        tracing::warn!(%symbol, provider = provider.name(), "bars out of order, normalizing");
        fetched.bars = normalize_bars(fetched.bars);
    }
    if fetched.bars.is_empty() {
        tracing::warn!(%symbol, %start, %end, "no price history in range");
    }
    tracing::debug!(
        %symbol,
        bars = fetched.bars.len(),
        void_bars = fetched.bars.iter().filter(|b| b.is_void()).count(),
        source = ?fetched.source,
        "fetched"
    );

    let series = compute_strategies(compute_indicators(fetched.into_series())?)?;
    let receipt = exporter.export(&series)?;

    let signals = series
        .signal_columns()
        .iter()
        .map(|c| {
            let (buys, sells) = count_signals(&c.values);
            SignalCount {
                column: c.name.clone(),
                buys,
                sells,
            }
        })
        .collect();

    Ok(SymbolReport {
        symbol: symbol.to_string(),
        rows: receipt.rows,
        path: receipt.path,
        signals,
        content_hash: receipt.content_hash,
    })
}

/// Discover instruments and process the first `config.max_symbols` of them.
pub fn run_batch(
    source: &dyn SymbolSource,
    provider: &dyn DataProvider,
    exporter: &dyn Exporter,
    config: &RunConfig,
    progress: &dyn PipelineProgress,
) -> Result<BatchSummary, RunError> {
    config.validate()?;
    let started = Instant::now();

    let mut symbols = source.discover().map_err(|e| {
        tracing::error!(source = source.name(), error = %e, "symbol discovery failed");
        e
    })?;
    let discovered = symbols.len();
    symbols.truncate(config.max_symbols);
    tracing::info!(
        source = source.name(),
        provider = provider.name(),
        discovered,
        selected = symbols.len(),
        "starting batch"
    );
    progress.on_discovered(&symbols);

    let run_one = |symbol: &String| {
        let outcome = process_symbol(
            provider,
            exporter,
            symbol,
            config.start_date,
            config.end_date,
        );
        match &outcome {
            Ok(report) => tracing::info!(
                %symbol,
                rows = report.rows,
                path = %report.path.display(),
                "exported"
            ),
            Err(e) => tracing::warn!(%symbol, error = %e, "skipping symbol"),
        }
        progress.on_symbol_done(symbol, outcome.as_ref());
        (symbol.clone(), outcome)
    };

    let outcomes: Vec<(String, Result<SymbolReport, SymbolError>)> = if config.parallel {
        match config.workers {
            Some(n) => rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()?
                .install(|| symbols.par_iter().map(run_one).collect()),
            None => symbols.par_iter().map(run_one).collect(),
        }
    } else {
        symbols.iter().map(run_one).collect()
    };

    let mut summary = BatchSummary {
        total: outcomes.len(),
        ..BatchSummary::default()
    };
    for (symbol, outcome) in outcomes {
        match outcome {
            Ok(report) => summary.reports.push(report),
            Err(error) => summary.failures.push(SymbolFailure { symbol, error }),
        }
    }
    summary.succeeded = summary.reports.len();
    summary.failed = summary.failures.len();
    summary.elapsed_secs = started.elapsed().as_secs_f64();

    tracing::info!(
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed,
        elapsed_secs = summary.elapsed_secs,
        "batch finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use siglab_core::data::{FetchResult, StaticSymbols};
    use siglab_core::domain::{PriceBar, Series};
    use siglab_core::ExportReceipt;
    use std::sync::Mutex;

    struct NoBars;

    impl DataProvider for NoBars {
        fn name(&self) -> &str {
            "no_bars"
        }
        fn fetch(&self, symbol: &str, _: NaiveDate, _: NaiveDate) -> Result<FetchResult, DataError> {
            Ok(FetchResult {
                symbol: symbol.to_string(),
                bars: Vec::new(),
                source: siglab_core::data::DataSource::Fixture,
            })
        }
    }

    /// Records what it was asked to export without touching the disk.
    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<(String, usize, usize)>>,
    }

    impl Exporter for Recording {
        fn export(&self, series: &Series) -> Result<ExportReceipt, ExportError> {
            self.seen.lock().unwrap().push((
                series.symbol().to_string(),
                series.len(),
                series.numeric_columns().len() + series.signal_columns().len(),
            ));
            Ok(ExportReceipt {
                path: PathBuf::from(format!("{}.csv", series.symbol())),
                rows: series.len(),
                bytes: 0,
                content_hash: String::new(),
            })
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Returns bars newest first with one date repeated.
    struct Shuffled;

    impl DataProvider for Shuffled {
        fn name(&self) -> &str {
            "shuffled"
        }
        fn fetch(&self, symbol: &str, _: NaiveDate, _: NaiveDate) -> Result<FetchResult, DataError> {
            let bar = |day: u32, close: f64| PriceBar {
                date: date(2024, 1, day),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1.0,
            };
            Ok(FetchResult {
                symbol: symbol.to_string(),
                bars: vec![bar(3, 3.0), bar(2, 2.0), bar(3, 30.0), bar(1, 1.0)],
                source: siglab_core::data::DataSource::Fixture,
            })
        }
    }

    /// Keeps the closes it was asked to export.
    #[derive(Default)]
    struct Closes(Mutex<Vec<f64>>);

    impl Exporter for Closes {
        fn export(&self, series: &Series) -> Result<ExportReceipt, ExportError> {
            *self.0.lock().unwrap() = series.bars().iter().map(|b| b.close).collect();
            Ok(ExportReceipt {
                path: PathBuf::from("x.csv"),
                rows: series.len(),
                bytes: 0,
                content_hash: String::new(),
            })
        }
    }

    #[test]
    fn empty_history_still_exported() {
        let exporter = Recording::default();
        let report =
            process_symbol(&NoBars, &exporter, "X", date(2024, 1, 1), date(2024, 2, 1)).unwrap();
        assert_eq!(report.rows, 0);
        assert_eq!(report.signals.len(), 3);
        assert!(report.signals.iter().all(|c| c.buys == 0 && c.sells == 0));
        assert_eq!(*exporter.seen.lock().unwrap(), [("X".to_string(), 0, 12)]);
    }

    #[test]
    fn unordered_bars_are_sorted_before_indicators() {
        let exporter = Closes::default();
        let report =
            process_symbol(&Shuffled, &exporter, "X", date(2024, 1, 1), date(2024, 1, 3)).unwrap();
        assert_eq!(report.rows, 3);
        // The later of the two 2024-01-03 bars wins.
        assert_eq!(*exporter.0.lock().unwrap(), [1.0, 2.0, 30.0]);
    }

    #[test]
    fn max_symbols_caps_the_batch() {
        let source = StaticSymbols::new(["A", "B", "C", "D"]);
        let exporter = Recording::default();
        let config = RunConfig {
            max_symbols: 2,
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 31),
            ..RunConfig::default()
        };
        let summary = run_batch(&source, &NoBars, &exporter, &config, &NoProgress).unwrap();
        assert_eq!(summary.total, 2);
        let names: Vec<&str> = summary.reports.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn invalid_config_rejected_before_discovery() {
        let config = RunConfig {
            max_symbols: 0,
            ..RunConfig::default()
        };
        let err = run_batch(
            &StaticSymbols::new(["A"]),
            &NoBars,
            &Recording::default(),
            &config,
            &NoProgress,
        )
        .unwrap_err();
        assert!(matches!(err, RunError::Config(_)));
    }
}
