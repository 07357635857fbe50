//! Domain types for SigLab

pub mod bar;
pub mod series;
pub mod signal;

pub use bar::{is_strictly_ascending, PriceBar};
pub use series::{columns, NumericColumn, Series, SeriesError, SignalColumn};
pub use signal::Signal;
