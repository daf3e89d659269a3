//! OHLCV candle data structure.

use candlefold_types::{Decimal, Tick};
use serde::{Deserialize, Serialize};

/// OHLCV candle for one interval bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket start, Unix seconds.
    pub time: i64,
    /// Opening price (first tick's open).
    pub open: Decimal,
    /// Highest price during the bucket.
    pub high: Decimal,
    /// Lowest price during the bucket.
    pub low: Decimal,
    /// Closing price (last tick's close).
    pub close: Decimal,
    /// Total volume.
    pub volume: Decimal,
}

impl Candle {
    /// Creates a new candle.
    #[must_use]
    pub const fn new(
        time: i64,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Creates a candle for bucket `time` from a single tick.
    #[must_use]
    pub fn from_tick(time: i64, tick: &Tick) -> Self {
        Self {
            time,
            open: tick.open.clone(),
            high: tick.high.clone(),
            low: tick.low.clone(),
            close: tick.close.clone(),
            volume: tick.volume.clone(),
        }
    }

    /// Creates an all-zero placeholder candle used for padding.
    #[must_use]
    pub fn placeholder(time: i64) -> Self {
        Self {
            time,
            open: Decimal::zero(),
            high: Decimal::zero(),
            low: Decimal::zero(),
            close: Decimal::zero(),
            volume: Decimal::zero(),
        }
    }

    /// Returns true if every OHLCV field is zero.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.open.is_zero()
            && self.high.is_zero()
            && self.low.is_zero()
            && self.close.is_zero()
            && self.volume.is_zero()
    }

    /// Returns the price range (high - low).
    #[must_use]
    pub fn range(&self) -> Decimal {
        &self.high - &self.low
    }

    /// Returns the body size (|close - open|).
    #[must_use]
    pub fn body(&self) -> Decimal {
        (&self.close - &self.open).abs()
    }

    /// Returns true if this is a bullish (green) candle.
    #[must_use]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Returns true if this is a bearish (red) candle.
    #[must_use]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Projects the candle to floating point for a chart.
    #[must_use]
    pub fn to_chart(&self) -> ChartCandle {
        ChartCandle {
            time: self.time,
            open: self.open.to_f64(),
            high: self.high.to_f64(),
            low: self.low.to_f64(),
            close: self.close.to_f64(),
            volume: self.volume.to_f64(),
        }
    }
}

/// Chart-ready candle with `f64` values.
///
/// Display projection only; never fed back into aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartCandle {
    /// Bucket start, Unix seconds.
    pub time: i64,
    /// Opening price.
    pub open: f64,
    /// Highest price.
    pub high: f64,
    /// Lowest price.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Total volume.
    pub volume: f64,
}

impl From<&Candle> for ChartCandle {
    fn from(candle: &Candle) -> Self {
        candle.to_chart()
    }
}

/// Percent change from the first to the last real candle's close.
///
/// Placeholders are skipped. Returns `None` with fewer than two real
/// candles or when the first close is zero.
#[must_use]
pub fn price_change_percent(candles: &[Candle]) -> Option<f64> {
    let mut real = candles.iter().filter(|c| !c.is_placeholder());
    let first = real.next()?;
    let last = real.last()?;

    let first_close = first.close.to_f64();
    if first_close == 0.0 {
        return None;
    }
    Some((last.close.to_f64() - first_close) / first_close * 100.0)
}
