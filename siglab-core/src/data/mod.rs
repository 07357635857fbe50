//! External collaborators: symbol discovery and price history.

pub mod circuit_breaker;
pub mod discovery;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use circuit_breaker::{BreakerState, CircuitBreaker, TripCause};
pub use discovery::{
    unique_symbols, DiscoveryError, StaticSymbols, SymbolSource, Universe, UniverseFile,
    YahooScreener,
};
pub use provider::{normalize_bars, DataError, DataProvider, DataSource, FetchResult};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
