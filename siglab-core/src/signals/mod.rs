//! Signal engine: three rule-based strategies sharing one state machine.
//!
//! Every strategy scans the series once, left to right, carrying a single
//! state: `AwaitingBuy` (initial) or `AwaitingSell`. In `AwaitingBuy` only the
//! buy predicate is consulted; when it holds the row gets `Buy` and the state
//! flips. `AwaitingSell` mirrors this with the sell predicate. All other rows
//! get `Signal::None`, so the emitted signals always alternate buy, sell, buy…
//!
//! Strategies are independent: each one reads indicator columns and adds
//! exactly one signal column. They never see each other's output.

pub mod bollinger;
pub mod ma_crossover;
pub mod rsi_threshold;

pub use bollinger::BollingerBreakout;
pub use ma_crossover::MaCrossover;
pub use rsi_threshold::RsiThreshold;

use crate::domain::{Series, SeriesError, Signal};

/// Position of the buy/sell state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyState {
    #[default]
    AwaitingBuy,
    AwaitingSell,
}

/// Trigger predicates for one strategy.
///
/// Predicates read the series at `index` and must treat undefined inputs as
/// false. Use [`gt`] / [`lt`] for comparisons so that rule holds.
pub trait SignalStrategy: Send + Sync {
    /// Human-readable name (e.g., "ma_crossover").
    fn name(&self) -> &str;

    /// Column the strategy writes.
    fn column(&self) -> &'static str;

    /// Fires the `AwaitingBuy → AwaitingSell` transition.
    fn buy_condition(&self, series: &Series, index: usize) -> bool;

    /// Fires the `AwaitingSell → AwaitingBuy` transition.
    fn sell_condition(&self, series: &Series, index: usize) -> bool;
}

/// `a > b`, false when either side is undefined.
pub fn gt(a: Option<f64>, b: Option<f64>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a > b)
}

/// `a < b`, false when either side is undefined.
pub fn lt(a: Option<f64>, b: Option<f64>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a < b)
}

/// Run the state machine and return the signal column without touching the series.
pub fn scan(strategy: &dyn SignalStrategy, series: &Series) -> Vec<Signal> {
    let (_, signals) = (0..series.len()).fold(
        (StrategyState::AwaitingBuy, Vec::with_capacity(series.len())),
        |(state, mut out), i| {
            let (next, signal) = match state {
                StrategyState::AwaitingBuy if strategy.buy_condition(series, i) => {
                    (StrategyState::AwaitingSell, Signal::Buy)
                }
                StrategyState::AwaitingSell if strategy.sell_condition(series, i) => {
                    (StrategyState::AwaitingBuy, Signal::Sell)
                }
                _ => (state, Signal::None),
            };
            out.push(signal);
            (next, out)
        },
    );
    signals
}

/// Run one strategy and append its column.
pub fn apply_strategy(
    strategy: &dyn SignalStrategy,
    mut series: Series,
) -> Result<Series, SeriesError> {
    let signals = scan(strategy, &series);
    let (buys, sells) = count_signals(&signals);
    tracing::debug!(
        symbol = series.symbol(),
        strategy = strategy.name(),
        buys,
        sells,
        "strategy applied"
    );
    series.insert_signal(strategy.column(), signals)?;
    Ok(series)
}

/// The three built-in strategies, in the order their columns are written.
pub fn default_strategies() -> Vec<Box<dyn SignalStrategy>> {
    vec![
        Box::new(BollingerBreakout),
        Box::new(MaCrossover),
        Box::new(RsiThreshold),
    ]
}

/// Apply every built-in strategy.
pub fn compute_strategies(series: Series) -> Result<Series, SeriesError> {
    default_strategies()
        .iter()
        .try_fold(series, |series, strategy| {
            apply_strategy(strategy.as_ref(), series)
        })
}

/// Number of buy and sell signals in a column.
pub fn count_signals(signals: &[Signal]) -> (usize, usize) {
    signals.iter().fold((0, 0), |(buys, sells), s| match s {
        Signal::Buy => (buys + 1, sells),
        Signal::Sell => (buys, sells + 1),
        Signal::None => (buys, sells),
    })
}

/// Build a series with synthetic bars and arbitrary numeric columns.
#[cfg(test)]
pub(crate) fn series_with(closes: &[f64], cols: &[(&str, Vec<Option<f64>>)]) -> Series {
    use crate::domain::PriceBar;
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: base + chrono::Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
        })
        .collect();
    let mut series = Series::new("TEST", bars);
    for (name, values) in cols {
        series.insert_numeric(*name, values.clone()).unwrap();
    }
    series
}
