//! Bulk tick-to-candle aggregation.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use candlefold_types::{Interval, Tick};

use crate::Candle;

/// Aggregates ticks into candles of width `interval`.
///
/// Ticks are grouped by bucket (`floor(time / interval) * interval`) and
/// each bucket is reduced in input order: the first tick seen sets the
/// open, the last one seen sets the close, high and low are running
/// extremes and volume is the exact sum. Input does not need to be sorted;
/// the output is always ascending by bucket time.
///
/// # Example
///
/// ```
/// use candlefold_aggregate::aggregate;
/// use candlefold_types::{Decimal, Interval, Tick};
///
/// let price = |s: &str| s.parse::<Decimal>().unwrap();
/// let ticks = vec![
///     Tick::new(61, price("10"), price("11"), price("9"), price("10.5"), price("1")),
///     Tick::new(3, price("8"), price("8"), price("8"), price("8"), price("2")),
/// ];
///
/// let candles = aggregate(&ticks, Interval::MINUTE_1);
/// assert_eq!(candles.len(), 2);
/// assert_eq!(candles[0].time, 0);
/// assert_eq!(candles[1].time, 60);
/// ```
#[must_use]
pub fn aggregate(ticks: &[Tick], interval: Interval) -> Vec<Candle> {
    let mut buckets: BTreeMap<i64, CandleBuilder> = BTreeMap::new();

    for tick in ticks {
        let bucket = interval.bucket(tick.time);
        match buckets.entry(bucket) {
            Entry::Vacant(entry) => {
                entry.insert(CandleBuilder::new(bucket, tick));
            }
            Entry::Occupied(mut entry) => entry.get_mut().update(tick),
        }
    }

    buckets.into_values().map(CandleBuilder::finish).collect()
}

/// Rebuilds the candle for `bucket` from the tail of a time-ordered tick series.
///
/// Only the trailing run of ticks that fall into `bucket` is folded, so the
/// cost is proportional to the ticks of the open bucket rather than the
/// whole history. Returns `None` if the last tick is not in `bucket`.
#[must_use]
pub fn open_candle(ticks: &[Tick], interval: Interval, bucket: i64) -> Option<Candle> {
    let start = ticks
        .iter()
        .rposition(|tick| interval.bucket(tick.time) != bucket)
        .map_or(0, |idx| idx + 1);

    let (first, rest) = ticks[start..].split_first()?;
    let mut builder = CandleBuilder::new(bucket, first);
    for tick in rest {
        builder.update(tick);
    }
    Some(builder.finish())
}

/// Builder for one candle.
#[derive(Debug)]
struct CandleBuilder {
    candle: Candle,
}

impl CandleBuilder {
    /// Creates a new builder from the first tick of the bucket.
    fn new(time: i64, tick: &Tick) -> Self {
        Self {
            candle: Candle::from_tick(time, tick),
        }
    }

    /// Updates the builder with a later tick of the same bucket.
    fn update(&mut self, tick: &Tick) {
        let candle = &mut self.candle;
        if tick.high > candle.high {
            candle.high = tick.high.clone();
        }
        if tick.low < candle.low {
            candle.low = tick.low.clone();
        }
        candle.close = tick.close.clone();
        candle.volume += &tick.volume;
    }

    /// Finishes building and returns the candle.
    fn finish(self) -> Candle {
        self.candle
    }
}
