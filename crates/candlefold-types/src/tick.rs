//! Tick data representation.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

use crate::Decimal;

/// A single market observation.
///
/// Either one trade or one already interval-stamped snapshot delivered by
/// the live transport. The usual OHLC relationships (`high` at or above
/// `open` and `close`, `low` at or below them) are expected upstream but
/// not enforced here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    /// Unix timestamp in whole seconds.
    pub time: i64,
    /// Opening price.
    pub open: Decimal,
    /// Highest price.
    pub high: Decimal,
    /// Lowest price.
    pub low: Decimal,
    /// Closing (latest) price.
    pub close: Decimal,
    /// Mark price.
    pub mark: Decimal,
    /// Traded volume.
    pub volume: Decimal,
    /// Number of trades.
    pub trades: u64,
}

impl Tick {
    /// Creates a tick from its OHLCV fields.
    ///
    /// The mark price defaults to `close` and the trade count to zero.
    #[must_use]
    pub fn new(
        time: i64,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            time,
            mark: close.clone(),
            open,
            high,
            low,
            close,
            volume,
            trades: 0,
        }
    }

    /// Sets the mark price.
    #[must_use]
    pub fn with_mark(mut self, mark: Decimal) -> Self {
        self.mark = mark;
        self
    }

    /// Sets the trade count.
    #[must_use]
    pub fn with_trades(mut self, trades: u64) -> Self {
        self.trades = trades;
        self
    }

    /// Returns true if `high` and `low` bracket both `open` and `close`.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}

/// Raw kline record as delivered on the wire, before scaling.
///
/// The wire format is a fixed-position numeric array:
/// `[high, low, open, close, mark, volume, trades, timestampMillis]`.
/// Price and volume fields are integers scaled by [`RawKline::SCALE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawKline {
    /// Scaled high price.
    pub high: i64,
    /// Scaled low price.
    pub low: i64,
    /// Scaled open price.
    pub open: i64,
    /// Scaled close price.
    pub close: i64,
    /// Scaled mark price.
    pub mark: i64,
    /// Scaled volume.
    pub volume: i64,
    /// Trade count (not scaled).
    pub trades: u64,
    /// Timestamp in milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
}

impl RawKline {
    /// Number of fields in a wire record.
    pub const FIELDS: usize = 8;

    /// Fixed factor applied to price and volume fields on the wire.
    pub const SCALE: NonZeroU32 = match NonZeroU32::new(10_000) {
        Some(scale) => scale,
        None => panic!("scale is non-zero"),
    };

    /// Normalizes the raw record into a [`Tick`].
    ///
    /// Prices and volume are divided exactly by [`RawKline::SCALE`]; the
    /// timestamp is floor-divided to whole seconds.
    #[must_use]
    pub fn normalize(self) -> Tick {
        let scale = Self::SCALE;
        Tick {
            time: self.timestamp_ms.div_euclid(1000),
            open: Decimal::from_scaled(self.open, scale),
            high: Decimal::from_scaled(self.high, scale),
            low: Decimal::from_scaled(self.low, scale),
            close: Decimal::from_scaled(self.close, scale),
            mark: Decimal::from_scaled(self.mark, scale),
            volume: Decimal::from_scaled(self.volume, scale),
            trades: self.trades,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_raw_kline_normalize() {
        let raw = RawKline {
            high: 150_000,
            low: 140_000,
            open: 145_000,
            close: 148_000,
            mark: 148_000,
            volume: 20_000,
            trades: 5,
            timestamp_ms: 1_700_000_000_000,
        };
        let tick = raw.normalize();

        assert_eq!(tick.time, 1_700_000_000);
        assert_eq!(tick.open, dec("14.5"));
        assert_eq!(tick.high, dec("15"));
        assert_eq!(tick.low, dec("14"));
        assert_eq!(tick.close, dec("14.8"));
        assert_eq!(tick.mark, dec("14.8"));
        assert_eq!(tick.volume, dec("2.0"));
        assert_eq!(tick.trades, 5);
    }

    #[test]
    fn test_timestamp_floors_to_seconds() {
        let raw = RawKline {
            high: 0,
            low: 0,
            open: 0,
            close: 0,
            mark: 0,
            volume: 0,
            trades: 0,
            timestamp_ms: 1_700_000_000_999,
        };
        assert_eq!(raw.normalize().time, 1_700_000_000);
    }

    #[test]
    fn test_tick_builder_defaults() {
        let tick = Tick::new(10, dec("1"), dec("2"), dec("0.5"), dec("1.5"), dec("3"));
        assert_eq!(tick.mark, dec("1.5"));
        assert_eq!(tick.trades, 0);
        assert!(tick.is_consistent());

        let tick = tick.with_mark(dec("1.4")).with_trades(7);
        assert_eq!(tick.mark, dec("1.4"));
        assert_eq!(tick.trades, 7);
    }

    #[test]
    fn test_inconsistent_tick_detected() {
        let tick = Tick::new(10, dec("1"), dec("0.9"), dec("0.5"), dec("1.5"), dec("3"));
        assert!(!tick.is_consistent());
    }
}
