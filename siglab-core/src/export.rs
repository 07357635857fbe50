//! Export: one row-oriented CSV file per instrument.
//!
//! Layout: `date,open,high,low,close,volume`, then the numeric columns and the
//! signal columns in the order they were added to the series. Undefined
//! values and the no-signal marker are empty cells. Floats use Rust's
//! shortest round-trip formatting, so identical input gives identical bytes.
//!
//! A zero-row series still produces a file holding just the header.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::Series;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What an export wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub path: PathBuf,
    pub rows: usize,
    pub bytes: usize,
    /// BLAKE3 hex digest of the file contents.
    pub content_hash: String,
}

pub trait Exporter: Send + Sync {
    fn export(&self, series: &Series) -> Result<ExportReceipt, ExportError>;
}

const BAR_HEADER: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

fn number(v: f64) -> String {
    if v.is_finite() {
        v.to_string()
    } else {
        String::new()
    }
}

fn optional(v: Option<f64>) -> String {
    v.map(number).unwrap_or_default()
}

/// Encode the full series as CSV bytes.
pub fn series_to_csv(series: &Series) -> Result<Vec<u8>, ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![]);

    let header: Vec<&str> = BAR_HEADER
        .iter()
        .copied()
        .chain(series.numeric_columns().iter().map(|c| c.name.as_str()))
        .chain(series.signal_columns().iter().map(|c| c.name.as_str()))
        .collect();
    wtr.write_record(&header)?;

    for (i, bar) in series.bars().iter().enumerate() {
        let mut record = vec![
            bar.date.format("%Y-%m-%d").to_string(),
            number(bar.open),
            number(bar.high),
            number(bar.low),
            number(bar.close),
            number(bar.volume),
        ];
        record.extend(series.numeric_columns().iter().map(|c| optional(c.values[i])));
        record.extend(
            series
                .signal_columns()
                .iter()
                .map(|c| c.values[i].as_str().to_string()),
        );
        wtr.write_record(&record)?;
    }

    wtr.into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))
}

/// File name for a symbol: `{symbol}.csv`, with path separators replaced.
pub fn file_name_for(symbol: &str) -> String {
    let safe: String = symbol
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{safe}.csv")
}

/// Writes `{output_dir}/{symbol}.csv`, overwriting any existing file.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    output_dir: PathBuf,
}

impl CsvExporter {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.output_dir.join(file_name_for(symbol))
    }
}

impl Exporter for CsvExporter {
    fn export(&self, series: &Series) -> Result<ExportReceipt, ExportError> {
        let data = series_to_csv(series)?;
        let path = self.path_for(series.symbol());

        std::fs::create_dir_all(&self.output_dir).map_err(|source| ExportError::Io {
            path: self.output_dir.clone(),
            source,
        })?;
        std::fs::write(&path, &data).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(ExportReceipt {
            path,
            rows: series.len(),
            bytes: data.len(),
            content_hash: blake3::hash(&data).to_hex().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PriceBar, Signal};
    use chrono::NaiveDate;

    fn small_series() -> Series {
        let bars = vec![
            PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                open: 1.0,
                high: 2.0,
                low: 0.5,
                close: 1.5,
                volume: 1000.0,
            },
            PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                open: 1.5,
                high: 2.5,
                low: 1.25,
                close: f64::NAN,
                volume: 2000.0,
            },
        ];
        let mut s = Series::new("BTC-USD", bars);
        s.insert_numeric("sma2", vec![None, Some(0.1)]).unwrap();
        s.insert_signal("signal_x", vec![Signal::Buy, Signal::None])
            .unwrap();
        s
    }

    #[test]
    fn csv_layout() {
        let csv = String::from_utf8(series_to_csv(&small_series()).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "date,open,high,low,close,volume,sma2,signal_x");
        assert_eq!(lines[1], "2024-01-02,1,2,0.5,1.5,1000,,buy");
        assert_eq!(lines[2], "2024-01-03,1.5,2.5,1.25,,2000,0.1,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn empty_series_is_header_only() {
        let mut s = Series::new("EMPTY", Vec::new());
        s.insert_numeric("rsi", Vec::new()).unwrap();
        let csv = String::from_utf8(series_to_csv(&s).unwrap()).unwrap();
        assert_eq!(csv, "date,open,high,low,close,volume,rsi\n");
    }

    #[test]
    fn file_names_are_flat() {
        assert_eq!(file_name_for("BTC-USD"), "BTC-USD.csv");
        assert_eq!(file_name_for("A/B"), "A_B.csv");
    }

    #[test]
    fn exporter_writes_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path());
        let path = exporter.path_for("BTC-USD");
        std::fs::write(&path, "stale").unwrap();

        let receipt = exporter.export(&small_series()).unwrap();
        assert_eq!(receipt.path, path);
        assert_eq!(receipt.rows, 2);

        let written = std::fs::read(&path).unwrap();
        assert_eq!(written.len(), receipt.bytes);
        assert_eq!(receipt.content_hash, blake3::hash(&written).to_hex().to_string());
        assert!(String::from_utf8(written).unwrap().starts_with("date,"));
    }

    #[test]
    fn exporter_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out/csv");
        let receipt = CsvExporter::new(&nested).export(&small_series()).unwrap();
        assert!(receipt.path.starts_with(&nested));
        assert!(receipt.path.exists());
    }
}
