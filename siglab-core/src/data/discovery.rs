//! Symbol discovery: where the list of instruments to process comes from.
//!
//! Three sources:
//! - `YahooScreener`: Yahoo's predefined crypto screener (the listing behind
//!   finance.yahoo.com/cryptocurrencies), most active first.
//! - `UniverseFile`: a TOML file with an ordered `symbols` list and optional
//!   named groups.
//! - `StaticSymbols`: an explicit list, e.g. from the command line.
//!
//! Every source returns a non-empty list with duplicates removed, first
//! occurrence kept. Discovery failure is fatal to a run.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::circuit_breaker::CircuitBreaker;
use super::yahoo::build_client;

const SCREENER_URL: &str = "https://query1.finance.yahoo.com/v1/finance/screener/predefined/saved";
const CRYPTO_SCREENER_ID: &str = "all_cryptocurrencies_us";

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("listing unreachable: {0}")]
    Network(String),

    #[error("listing could not be parsed: {0}")]
    Parse(String),

    #[error("read universe file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("hard stop: listing provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("no symbols discovered")]
    Empty,
}

pub trait SymbolSource: Send + Sync {
    fn name(&self) -> &str;

    /// Ordered, de-duplicated, non-empty list of symbols.
    fn discover(&self) -> Result<Vec<String>, DiscoveryError>;
}

/// Trim, drop blanks, drop repeats (first wins), reject an empty result.
pub fn unique_symbols<I, S>(symbols: I) -> Result<Vec<String>, DiscoveryError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let out: Vec<String> = symbols
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect();
    if out.is_empty() {
        return Err(DiscoveryError::Empty);
    }
    Ok(out)
}

// ─── Static list ────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StaticSymbols {
    symbols: Vec<String>,
}

impl StaticSymbols {
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
        }
    }
}

impl SymbolSource for StaticSymbols {
    fn name(&self) -> &str {
        "static"
    }

    fn discover(&self) -> Result<Vec<String>, DiscoveryError> {
        unique_symbols(&self.symbols)
    }
}

// ─── Universe file ──────────────────────────────────────────────────

/// Universe configuration stored as TOML.
///
/// ```toml
/// symbols = ["BTC-USD", "ETH-USD"]
///
/// [groups]
/// layer1 = ["SOL-USD", "ADA-USD"]
/// ```
///
/// Discovery order: `symbols` first, then each group in name order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    #[serde(default)]
    pub symbols: Vec<String>,
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<String>>,
}

impl Universe {
    pub fn from_toml(content: &str) -> Result<Self, DiscoveryError> {
        toml::from_str(content).map_err(|e| DiscoveryError::Parse(format!("universe TOML: {e}")))
    }

    pub fn to_toml(&self) -> Result<String, DiscoveryError> {
        toml::to_string_pretty(self)
            .map_err(|e| DiscoveryError::Parse(format!("serialize universe: {e}")))
    }

    /// Every listed symbol in discovery order (may contain repeats).
    pub fn all_symbols(&self) -> Vec<&str> {
        self.symbols
            .iter()
            .chain(self.groups.values().flatten())
            .map(String::as_str)
            .collect()
    }

    pub fn group(&self, name: &str) -> Option<&[String]> {
        self.groups.get(name).map(Vec::as_slice)
    }
}

/// Reads a `Universe` from disk on every `discover` call.
#[derive(Debug, Clone)]
pub struct UniverseFile {
    path: PathBuf,
}

impl UniverseFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self) -> Result<Universe, DiscoveryError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| DiscoveryError::Io {
            path: self.path.clone(),
            source,
        })?;
        Universe::from_toml(&content)
    }
}

impl SymbolSource for UniverseFile {
    fn name(&self) -> &str {
        "universe_file"
    }

    fn discover(&self) -> Result<Vec<String>, DiscoveryError> {
        unique_symbols(self.load()?.all_symbols())
    }
}

// ─── Yahoo screener ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ScreenerResponse {
    finance: ScreenerFinance,
}

#[derive(Debug, Deserialize)]
struct ScreenerFinance {
    result: Option<Vec<ScreenerResult>>,
    error: Option<ScreenerError>,
}

#[derive(Debug, Deserialize)]
struct ScreenerError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ScreenerResult {
    #[serde(default)]
    quotes: Vec<ScreenerQuote>,
}

#[derive(Debug, Deserialize)]
struct ScreenerQuote {
    symbol: String,
}

pub struct YahooScreener {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    count: usize,
}

impl YahooScreener {
    pub fn new(circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DiscoveryError> {
        let client = build_client(Duration::from_secs(30))
            .map_err(|e| DiscoveryError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            circuit_breaker,
            count: 100,
        })
    }

    /// Number of listing rows requested.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count.max(1);
        self
    }

    fn screener_url(&self) -> String {
        format!("{SCREENER_URL}?scrIds={CRYPTO_SCREENER_ID}&count={}", self.count)
    }

    fn parse_response(body: &str) -> Result<Vec<String>, DiscoveryError> {
        let resp: ScreenerResponse = serde_json::from_str(body)
            .map_err(|e| DiscoveryError::Parse(format!("screener response: {e}")))?;

        let results = resp.finance.result.ok_or_else(|| match resp.finance.error {
            Some(err) => DiscoveryError::Parse(format!("{}: {}", err.code, err.description)),
            None => DiscoveryError::Parse("empty result with no error".into()),
        })?;

        unique_symbols(
            results
                .into_iter()
                .flat_map(|r| r.quotes)
                .map(|q| q.symbol),
        )
    }
}

impl SymbolSource for YahooScreener {
    fn name(&self) -> &str {
        "yahoo_screener"
    }

    fn discover(&self) -> Result<Vec<String>, DiscoveryError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(DiscoveryError::CircuitBreakerTripped);
        }

        let resp = self
            .client
            .get(self.screener_url())
            .send()
            .map_err(|e| DiscoveryError::Network(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::FORBIDDEN {
            self.circuit_breaker.trip();
            return Err(DiscoveryError::CircuitBreakerTripped);
        }
        if !status.is_success() {
            self.circuit_breaker.record_failure();
            return Err(DiscoveryError::Network(format!("HTTP {status} from screener")));
        }

        let body = resp
            .text()
            .map_err(|e| DiscoveryError::Network(e.to_string()))?;
        let symbols = Self::parse_response(&body)?;
        self.circuit_breaker.record_success();
        tracing::debug!(count = symbols.len(), "screener listing received");
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_keeps_first_occurrence() {
        let out = unique_symbols(["ETH-USD", " BTC-USD ", "ETH-USD", "", "SOL-USD"]).unwrap();
        assert_eq!(out, ["ETH-USD", "BTC-USD", "SOL-USD"]);
    }

    #[test]
    fn unique_rejects_empty() {
        assert!(matches!(
            unique_symbols(Vec::<String>::new()),
            Err(DiscoveryError::Empty)
        ));
        assert!(matches!(unique_symbols(["  "]), Err(DiscoveryError::Empty)));
    }

    #[test]
    fn static_source() {
        let src = StaticSymbols::new(["A", "B", "A"]);
        assert_eq!(src.discover().unwrap(), ["A", "B"]);
    }

    #[test]
    fn universe_order_symbols_then_groups() {
        let u = Universe::from_toml(
            r#"
            symbols = ["BTC-USD", "ETH-USD"]

            [groups]
            stable = ["USDT-USD"]
            layer1 = ["SOL-USD", "BTC-USD"]
            "#,
        )
        .unwrap();
        assert_eq!(
            u.all_symbols(),
            ["BTC-USD", "ETH-USD", "SOL-USD", "BTC-USD", "USDT-USD"]
        );
        assert_eq!(u.group("stable").unwrap(), ["USDT-USD".to_string()]);
        assert_eq!(
            unique_symbols(u.all_symbols()).unwrap(),
            ["BTC-USD", "ETH-USD", "SOL-USD", "USDT-USD"]
        );
    }

    #[test]
    fn universe_toml_roundtrip() {
        let u = Universe {
            symbols: vec!["BTC-USD".into(), "ETH-USD".into()],
            groups: BTreeMap::from([("layer1".to_string(), vec!["SOL-USD".to_string()])]),
        };
        let parsed = Universe::from_toml(&u.to_toml().unwrap()).unwrap();
        assert_eq!(u, parsed);
    }

    #[test]
    fn universe_file_missing() {
        let src = UniverseFile::new("/definitely/not/here.toml");
        assert!(matches!(src.discover(), Err(DiscoveryError::Io { .. })));
    }

    #[test]
    fn universe_file_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("universe.toml");
        std::fs::write(&path, "symbols = [\"DOGE-USD\", \"ADA-USD\"]\n").unwrap();
        assert_eq!(
            UniverseFile::new(&path).discover().unwrap(),
            ["DOGE-USD", "ADA-USD"]
        );
    }

    #[test]
    fn open_breaker_stops_discovery_without_a_request() {
        let breaker = Arc::new(CircuitBreaker::default_provider());
        breaker.trip();
        let screener = YahooScreener::new(Arc::clone(&breaker)).unwrap();
        assert!(matches!(
            screener.discover(),
            Err(DiscoveryError::CircuitBreakerTripped)
        ));
    }

    #[test]
    fn screener_parse() {
        let body = r#"{"finance":{"result":[{"count":3,"quotes":[
            {"symbol":"BTC-USD","shortName":"Bitcoin USD"},
            {"symbol":"ETH-USD"},
            {"symbol":"BTC-USD"}
        ]}],"error":null}}"#;
        assert_eq!(
            YahooScreener::parse_response(body).unwrap(),
            ["BTC-USD", "ETH-USD"]
        );
    }

    #[test]
    fn screener_error_payload() {
        let body = r#"{"finance":{"result":null,"error":{"code":"Bad Request","description":"invalid scrIds"}}}"#;
        assert!(matches!(
            YahooScreener::parse_response(body),
            Err(DiscoveryError::Parse(_))
        ));
    }

    #[test]
    fn screener_empty_listing() {
        let body = r#"{"finance":{"result":[{"quotes":[]}],"error":null}}"#;
        assert!(matches!(
            YahooScreener::parse_response(body),
            Err(DiscoveryError::Empty)
        ));
    }
}
