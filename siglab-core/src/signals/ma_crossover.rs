//! Moving average crossover: buy while sma20 is above sma50, sell once it
//! drops below.
//!
//! Unlike an edge-triggered golden/death cross, the predicates are level
//! conditions: the state machine turns them into one signal per regime.

use crate::domain::{columns, Series};

use super::{gt, lt, SignalStrategy};

/// MA crossover on the fixed 20/50 pair.
///
/// # Indicator dependencies
/// `sma20`, `sma50`
#[derive(Debug, Clone, Copy, Default)]
pub struct MaCrossover;

impl SignalStrategy for MaCrossover {
    fn name(&self) -> &str {
        "ma_crossover"
    }

    fn column(&self) -> &'static str {
        columns::SIGNAL_MA
    }

    fn buy_condition(&self, series: &Series, index: usize) -> bool {
        gt(
            series.value(columns::SMA20, index),
            series.value(columns::SMA50, index),
        )
    }

    fn sell_condition(&self, series: &Series, index: usize) -> bool {
        lt(
            series.value(columns::SMA20, index),
            series.value(columns::SMA50, index),
        )
    }
}
