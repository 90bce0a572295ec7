//! OHLC candle type and series validation.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DataError;

/// OHLC candle for simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time.
    pub timestamp: NaiveDateTime,
    /// Open price.
    pub open: Decimal,
    /// High price.
    pub high: Decimal,
    /// Low price.
    pub low: Decimal,
    /// Close price.
    pub close: Decimal,
    /// Traded volume, when the source provides it.
    pub volume: Option<Decimal>,
}

impl Candle {
    /// Create a candle without volume.
    #[must_use]
    pub const fn new(
        timestamp: NaiveDateTime,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume: None,
        }
    }

    /// Attach a volume.
    #[must_use]
    pub const fn with_volume(mut self, volume: Decimal) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Close above open.
    #[must_use]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Close below open.
    #[must_use]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// Check that a series can be simulated.
///
/// The series must hold at least `min_len` candles, be sorted by timestamp
/// (equal timestamps are allowed) and have well-formed price ranges.
pub fn validate_series(candles: &[Candle], min_len: usize) -> Result<(), DataError> {
    if candles.is_empty() {
        return Err(DataError::Empty);
    }
    if candles.len() < min_len {
        return Err(DataError::Insufficient {
            required: min_len,
            actual: candles.len(),
        });
    }

    for (index, candle) in candles.iter().enumerate() {
        if candle.low <= Decimal::ZERO {
            return Err(DataError::InvalidCandle {
                index,
                reason: format!("non-positive low {}", candle.low),
            });
        }
        if candle.high < candle.low {
            return Err(DataError::InvalidCandle {
                index,
                reason: format!("high {} below low {}", candle.high, candle.low),
            });
        }
        if index > 0 && candle.timestamp < candles[index - 1].timestamp {
            return Err(DataError::Unsorted {
                index,
                timestamp: candle.timestamp,
            });
        }
    }

    Ok(())
}
