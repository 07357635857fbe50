//! Series: an instrument's bars plus the derived columns aligned to them.
//!
//! Columns are stored in insertion order so the exported file layout is
//! fixed by the order the pipeline stages run in. Every column has exactly
//! one entry per bar; `insert_*` rejects anything else.

use thiserror::Error;

use super::bar::PriceBar;
use super::signal::Signal;

/// Column names produced by the indicator and signal engines.
pub mod columns {
    pub const SMA20: &str = "sma20";
    pub const SMA50: &str = "sma50";
    pub const SMA200: &str = "sma200";
    pub const BOLL_LOW: &str = "boll_low";
    pub const BOLL_HIGH: &str = "boll_high";
    pub const DAILY_RETURN: &str = "daily_return";
    pub const MONTHLY_RETURN: &str = "monthly_return";
    pub const ANNUAL_RETURN: &str = "annual_return";
    pub const RSI: &str = "rsi";
    pub const SIGNAL_MA: &str = "signal_ma";
    pub const SIGNAL_BO: &str = "signal_bo";
    pub const SIGNAL_RSI: &str = "signal_rsi";
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeriesError {
    #[error("column '{name}' has {actual} entries, series has {expected} bars")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("column '{0}' already exists")]
    DuplicateColumn(String),
}

/// A named numeric column. `None` marks an undefined entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// A named categorical signal column.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalColumn {
    pub name: String,
    pub values: Vec<Signal>,
}

/// Bars for one instrument plus derived columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    symbol: String,
    bars: Vec<PriceBar>,
    numeric: Vec<NumericColumn>,
    signals: Vec<SignalColumn>,
}

impl Series {
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
            numeric: Vec::new(),
            signals: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Close prices with NaN mapped to undefined.
    pub fn closes(&self) -> Vec<Option<f64>> {
        self.bars.iter().map(PriceBar::close_value).collect()
    }

    fn check_new(&self, name: &str, len: usize) -> Result<(), SeriesError> {
        if self.has_column(name) {
            return Err(SeriesError::DuplicateColumn(name.to_string()));
        }
        if len != self.bars.len() {
            return Err(SeriesError::LengthMismatch {
                name: name.to_string(),
                expected: self.bars.len(),
                actual: len,
            });
        }
        Ok(())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.numeric.iter().any(|c| c.name == name) || self.signals.iter().any(|c| c.name == name)
    }

    /// Append a numeric column.
    pub fn insert_numeric(
        &mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<(), SeriesError> {
        let name = name.into();
        self.check_new(&name, values.len())?;
        self.numeric.push(NumericColumn { name, values });
        Ok(())
    }

    /// Append a signal column.
    pub fn insert_signal(
        &mut self,
        name: impl Into<String>,
        values: Vec<Signal>,
    ) -> Result<(), SeriesError> {
        let name = name.into();
        self.check_new(&name, values.len())?;
        self.signals.push(SignalColumn { name, values });
        Ok(())
    }

    pub fn numeric(&self, name: &str) -> Option<&[Option<f64>]> {
        self.numeric
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Value of a numeric column at `index`. Missing column, out-of-range
    /// index and undefined entries all read as `None`.
    pub fn value(&self, name: &str, index: usize) -> Option<f64> {
        self.numeric(name)
            .and_then(|v| v.get(index).copied())
            .flatten()
    }

    pub fn signal(&self, name: &str) -> Option<&[Signal]> {
        self.signals
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn numeric_columns(&self) -> &[NumericColumn] {
        &self.numeric
    }

    pub fn signal_columns(&self) -> &[SignalColumn] {
        &self.signals
    }
}
