//! Candle sources for backtest runs.
//!
//! CSV input is `timestamp,open,high,low,close[,volume]` with a header row.
//! Rows that cannot be parsed are skipped and counted, never fatal.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::candle::Candle;
use super::error::DataError;
use super::parallel::StrategyDefinition;

/// Anything that can produce a candle series for one strategy.
pub trait CandleSource: Send + Sync {
    /// Source identifier used in logs and errors.
    fn name(&self) -> &str;

    /// Load the full series.
    fn load(&self) -> Result<Vec<Candle>, DataError>;
}

/// Candles already held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryCandleSource {
    name: String,
    candles: Vec<Candle>,
}

impl InMemoryCandleSource {
    /// Wrap a candle series.
    #[must_use]
    pub fn new(name: impl Into<String>, candles: Vec<Candle>) -> Self {
        Self {
            name: name.into(),
            candles,
        }
    }
}

impl CandleSource for InMemoryCandleSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<Vec<Candle>, DataError> {
        Ok(self.candles.clone())
    }
}

/// CSV file on disk.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    name: String,
    path: PathBuf,
}

impl CsvFileSource {
    /// Source reading `path`.
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// File path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CandleSource for CsvFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<Vec<Candle>, DataError> {
        let text = fs::read_to_string(&self.path).map_err(|e| DataError::Source {
            source_name: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        let parsed = parse_candles_csv(&text);
        if parsed.skipped_rows > 0 {
            warn!(
                path = %self.path.display(),
                skipped = parsed.skipped_rows,
                "Skipped unparsable candle rows"
            );
        }
        debug!(
            path = %self.path.display(),
            candles = parsed.candles.len(),
            "Loaded candle file"
        );

        Ok(parsed.candles)
    }
}

/// Result of parsing candle CSV text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedCandles {
    /// Parsed candles, sorted by timestamp.
    pub candles: Vec<Candle>,
    /// Data rows that were dropped.
    pub skipped_rows: usize,
}

/// Parse `timestamp,open,high,low,close[,volume]` rows after a header line.
///
/// Rows with a bad timestamp, a bad price, non-positive prices or a high
/// below the low are skipped. Output is sorted by timestamp, keeping file
/// order for equal timestamps.
#[must_use]
pub fn parse_candles_csv(text: &str) -> ParsedCandles {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut parsed = ParsedCandles::default();

    for record in reader.records() {
        match record.ok().as_ref().and_then(parse_row) {
            Some(candle) => parsed.candles.push(candle),
            None => parsed.skipped_rows += 1,
        }
    }

    parsed.candles.sort_by_key(|c| c.timestamp);
    parsed
}

fn parse_row(record: &StringRecord) -> Option<Candle> {
    if record.iter().all(str::is_empty) {
        return None;
    }

    let timestamp = parse_timestamp(record.get(0)?)?;
    let price = |i: usize| Decimal::from_str(record.get(i)?).ok();
    let (open, high, low, close) = (price(1)?, price(2)?, price(3)?, price(4)?);

    if [open, high, low, close].iter().any(|p| *p <= Decimal::ZERO) || high < low {
        return None;
    }

    let candle = Candle::new(timestamp, open, high, low, close);
    match record.get(5).filter(|v| !v.is_empty()) {
        Some(volume) => Some(candle.with_volume(Decimal::from_str(volume).ok()?)),
        None => Some(candle),
    }
}

/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, RFC 3339,
/// `YYYY-MM-DD` and epoch seconds.
fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    for format in FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Some(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.naive_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    value
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|ts| ts.naive_utc())
}

/// One strategy per `*.csv` file in `dir`, named after the file stem and
/// sorted by name.
pub fn discover_csv_strategies(dir: &Path) -> Result<Vec<StrategyDefinition>, DataError> {
    let source_error = |e: std::io::Error| DataError::Source {
        source_name: dir.display().to_string(),
        message: e.to_string(),
    };

    let mut strategies = Vec::new();
    for entry in fs::read_dir(dir).map_err(source_error)? {
        let path = entry.map_err(source_error)?.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if !is_csv || !path.is_file() {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let name = name.to_string();
        let source = Arc::new(CsvFileSource::new(name.clone(), path));
        strategies.push(StrategyDefinition::new(name, source));
    }

    strategies.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(dir = %dir.display(), count = strategies.len(), "Discovered strategy files");

    Ok(strategies)
}
