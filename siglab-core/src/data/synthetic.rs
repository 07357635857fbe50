//! Synthetic history for offline runs.
//!
//! Generates a deterministic random walk seeded from the symbol name, one bar
//! per calendar day (crypto trades every day). The same symbol and range
//! always produce the same bars.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    start_price: f64,
    max_daily_move: f64,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self {
            start_price: 100.0,
            max_daily_move: 0.03,
        }
    }
}

impl SyntheticProvider {
    pub fn generate(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<PriceBar> {
        let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let mut bars = Vec::new();
        let mut price = self.start_price;
        for date in start.iter_days().take_while(|d| *d <= end) {
            let daily_return: f64 = rng.gen_range(-self.max_daily_move..self.max_daily_move);
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000..5_000_000u64) as f64;

            bars.push(PriceBar {
                date,
                open,
                high,
                low,
                close,
                volume,
            });
            price = close;
        }
        bars
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        if start > end {
            return Err(DataError::InvalidRange { start, end });
        }
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars: self.generate(symbol, start, end),
            source: DataSource::Synthetic,
        })
    }
}
