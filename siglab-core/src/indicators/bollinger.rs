//! Bollinger bands around the 50-row SMA.
//!
//! The band offset is ONE scalar per series: the population standard
//! deviation (divide by N) of every defined `sma200` entry. It is not a
//! rolling statistic, so `boll_high - boll_low` is the same on every row.
//!
//! - Lower: sma50 - sigma
//! - Upper: sma50 + sigma

/// Population standard deviation over the defined entries.
///
/// Returns `None` when no entry is defined.
pub fn population_std(values: &[Option<f64>]) -> Option<f64> {
    let defined: Vec<f64> = values.iter().flatten().copied().collect();
    if defined.is_empty() {
        return None;
    }
    let n = defined.len() as f64;
    let mean = defined.iter().sum::<f64>() / n;
    let variance = defined
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;
    Some(variance.sqrt())
}

/// Lower and upper bands, in that order.
pub struct Bands {
    pub lower: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
}

/// Build both bands from the middle line and the series-wide sigma source.
pub fn bollinger_bands(sma50: &[Option<f64>], sma200: &[Option<f64>]) -> Bands {
    let sigma = population_std(sma200);
    let band = |sign: f64| -> Vec<Option<f64>> {
        sma50
            .iter()
            .map(|mid| Some(mid.as_ref()? + sign * sigma?))
            .collect()
    };
    Bands {
        lower: band(-1.0),
        upper: band(1.0),
    }
}
