//! Placeholder padding so a chart always has a minimum number of candles.

use candlefold_types::Interval;
use chrono::Utc;
use tracing::trace;

use crate::Candle;

/// Pads `series` to at least `min_count` candles using the current time.
///
/// See [`pad_to_minimum_at`].
#[must_use]
pub fn pad_to_minimum(series: Vec<Candle>, interval: Interval, min_count: usize) -> Vec<Candle> {
    pad_to_minimum_at(series, interval, min_count, Utc::now().timestamp())
}

/// Pads `series` to at least `min_count` candles.
///
/// Placeholders are all-zero candles prepended one interval apart, ending
/// one interval before the anchor: the first real candle or, for an empty
/// series, the bucket containing `now`. A series already long enough is returned as
/// is; real candles are never removed or modified.
#[must_use]
pub fn pad_to_minimum_at(
    series: Vec<Candle>,
    interval: Interval,
    min_count: usize,
    now: i64,
) -> Vec<Candle> {
    let missing = min_count.saturating_sub(series.len());
    if missing == 0 {
        return series;
    }

    let step = interval.as_i64();
    let anchor = series
        .first()
        .map_or_else(|| interval.bucket(now), |first| first.time);

    let mut padded = Vec::with_capacity(min_count);
    for i in (1..=missing).rev() {
        let back = i64::try_from(i).unwrap_or(i64::MAX);
        padded.push(Candle::placeholder(
            anchor.saturating_sub(back.saturating_mul(step)),
        ));
    }
    trace!(missing, anchor, "padded series with placeholders");

    padded.extend(series);
    padded
}
