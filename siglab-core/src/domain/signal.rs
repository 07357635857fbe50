//! Categorical signal values emitted by the strategy state machines.

use serde::{Deserialize, Serialize};

/// One cell of a signal column.
///
/// `None` is the explicit no-signal marker; it is a variant rather than an
/// `Option` so a signal column is never confused with a numeric one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    #[default]
    None,
    Buy,
    Sell,
}

impl Signal {
    /// Text written to exported files. The no-signal marker is an empty cell.
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::None => "",
            Signal::Buy => "buy",
            Signal::Sell => "sell",
        }
    }

    pub fn is_some(&self) -> bool {
        !matches!(self, Signal::None)
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_text() {
        assert_eq!(Signal::Buy.as_str(), "buy");
        assert_eq!(Signal::Sell.as_str(), "sell");
        assert_eq!(Signal::None.as_str(), "");
    }

    #[test]
    fn default_is_none() {
        assert_eq!(Signal::default(), Signal::None);
        assert!(!Signal::None.is_some());
        assert!(Signal::Sell.is_some());
    }
}
