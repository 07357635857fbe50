//! SigLab Core: price series, indicator engine, signal state machines, I/O adapters.
//!
//! This crate contains:
//! - Domain types (price bars, series with aligned derived columns, signals)
//! - Indicator engine (SMA 20/50/200, Bollinger bands, returns, RSI)
//! - Signal engine (MA crossover, Bollinger breakout, RSI threshold)
//! - Data providers (Yahoo Finance, synthetic) and symbol discovery
//! - CSV export

pub mod data;
pub mod domain;
pub mod export;
pub mod indicators;
pub mod signals;

pub use domain::{PriceBar, Series, SeriesError, Signal};
pub use export::{CsvExporter, ExportError, ExportReceipt, Exporter};
pub use indicators::compute_indicators;
pub use signals::{compute_strategies, SignalStrategy};
