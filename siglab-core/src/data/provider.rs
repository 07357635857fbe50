//! Data provider trait and structured error types.
//!
//! `DataProvider` abstracts over history sources (Yahoo Finance, synthetic
//! bars) so the pipeline can be driven by mocks in tests. Providers return
//! bars ascending by date with unique dates; an empty result is valid.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{PriceBar, Series};

/// Errors from a history fetch. Every variant is per-symbol and non-fatal to a batch.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("data error: {0}")]
    Other(String),
}

/// Where the bars came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    Synthetic,
    Fixture,
}

/// Result of a successful fetch for one symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
    pub source: DataSource,
}

impl FetchResult {
    /// Start a fresh series for the pipeline.
    pub fn into_series(self) -> Series {
        Series::new(self.symbol, self.bars)
    }
}

/// Sort by date and keep the last bar seen for any repeated date.
pub fn normalize_bars(mut bars: Vec<PriceBar>) -> Vec<PriceBar> {
    bars.reverse();
    // Stable sort keeps the later (now earlier) duplicate first; dedup keeps it.
    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);
    bars
}

pub trait DataProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch daily bars for `symbol` over `[start, end]`.
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError>;

    /// False while the provider refuses requests (e.g. circuit breaker open).
    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn normalize_sorts_and_keeps_last_duplicate() {
        let bars = vec![bar(3, 3.0), bar(1, 1.0), bar(3, 30.0), bar(2, 2.0)];
        let out = normalize_bars(bars);
        let closes: Vec<f64> = out.iter().map(|b| b.close).collect();
        assert_eq!(closes, [1.0, 2.0, 30.0]);
    }

    #[test]
    fn into_series_keeps_symbol_and_bars() {
        let fetched = FetchResult {
            symbol: "BTC-USD".into(),
            bars: vec![bar(1, 1.0)],
            source: DataSource::Fixture,
        };
        let series = fetched.into_series();
        assert_eq!(series.symbol(), "BTC-USD");
        assert_eq!(series.len(), 1);
    }
}
