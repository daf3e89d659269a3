//! Replay of buffered live ticks over a reloaded base series.

use std::collections::VecDeque;
use std::collections::vec_deque;

use candlefold_types::Tick;
use tracing::debug;

use crate::merge::{MergeAction, SeriesState, Timestamped};

/// Rebuilds a series from a reloaded base plus buffered live updates.
///
/// An out-of-order base is stable-sorted by time. Entries sharing a time
/// are all kept in their original order, so raw ticks traded in the same
/// second still reach aggregation. Buffered updates are then merged in arrival order under
/// the usual rules: older than the current last element is dropped, equal
/// replaces it and newer is appended. Dropped updates are counted and
/// reported once at `debug`.
///
/// # Example
///
/// ```
/// use candlefold_aggregate::rehydrate;
/// use candlefold_types::{Decimal, Tick};
///
/// let tick = |time: i64, close: i64| {
///     let c = Decimal::from(close);
///     Tick::new(time, c.clone(), c.clone(), c.clone(), c, Decimal::zero())
/// };
///
/// let series = rehydrate(
///     vec![tick(100, 10)],
///     vec![tick(100, 12), tick(110, 15), tick(90, 5)],
/// );
/// let times: Vec<_> = series.iter().map(|t| t.time).collect();
/// assert_eq!(times, vec![100, 110]);
/// assert_eq!(series[0].close, Decimal::from(12_i64));
/// ```
#[must_use]
pub fn rehydrate<T, I>(base: Vec<T>, buffered: I) -> Vec<T>
where
    T: Timestamped,
    I: IntoIterator<Item = T>,
{
    let mut state = SeriesState::from_series(normalize_base(base));
    let mut dropped = 0usize;
    let mut replayed = 0usize;

    for item in buffered {
        match MergeAction::classify(state.last_bucket_time(), item.time()) {
            MergeAction::Reject { .. } => dropped += 1,
            action => {
                state.commit(action, item);
                replayed += 1;
            }
        }
    }

    if replayed > 0 || dropped > 0 {
        debug!(replayed, dropped, len = state.len(), "replayed buffered updates");
    }
    state.into_items()
}

/// Stable-sorts the base by time unless it is already non-decreasing.
fn normalize_base<T: Timestamped>(mut base: Vec<T>) -> Vec<T> {
    if !base.is_sorted_by_key(Timestamped::time) {
        base.sort_by_key(Timestamped::time);
    }
    base
}

/// Bounded log of recently received live ticks.
///
/// Holds what arrived since the last reload so it can be replayed over a
/// fresh base. When full the oldest tick is evicted.
#[derive(Debug, Clone)]
pub struct TickLog {
    ticks: VecDeque<Tick>,
    capacity: usize,
}

impl TickLog {
    /// Default number of retained ticks.
    pub const DEFAULT_CAPACITY: usize = 600;

    /// Creates a log with [`TickLog::DEFAULT_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a log retaining at most `capacity` ticks (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ticks: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a tick, returning the evicted oldest tick if the log was full.
    pub fn push(&mut self, tick: Tick) -> Option<Tick> {
        let evicted = if self.ticks.len() == self.capacity {
            self.ticks.pop_front()
        } else {
            None
        };
        self.ticks.push_back(tick);
        evicted
    }

    /// Returns the number of retained ticks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    /// Returns true if the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Returns the maximum number of retained ticks.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates from oldest to newest.
    pub fn iter(&self) -> vec_deque::Iter<'_, Tick> {
        self.ticks.iter()
    }

    /// Drops every retained tick.
    pub fn clear(&mut self) {
        self.ticks.clear();
    }

    /// Returns the retained ticks, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Tick> {
        self.ticks.iter().cloned().collect()
    }
}

impl Default for TickLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Candle, aggregate};
    use candlefold_types::{Decimal, Interval};

    fn tick(time: i64, close: i64) -> Tick {
        let c = Decimal::from(close);
        Tick::new(time, c.clone(), c.clone(), c.clone(), c, Decimal::from(1_i64))
    }

    fn candle(time: i64, close: i64) -> Candle {
        let c = Decimal::from(close);
        Candle::new(time, c.clone(), c.clone(), c.clone(), c, Decimal::from(1_i64))
    }

    #[test]
    fn test_replay_example() {
        let interval = Interval::from_seconds(10).unwrap();
        let series = rehydrate(
            vec![tick(100, 10)],
            vec![tick(100, 12), tick(110, 15), tick(90, 5)],
        );
        let candles = aggregate(&series, interval);

        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].time, 100);
        assert_eq!(candles[0].close, Decimal::from(12_i64));
        assert_eq!(candles[1].time, 110);
        assert_eq!(candles[1].close, Decimal::from(15_i64));
    }

    #[test]
    fn test_replay_without_buffer_keeps_base() {
        let base = vec![candle(0, 1), candle(60, 2)];
        assert_eq!(rehydrate(base.clone(), Vec::new()), base);
    }

    #[test]
    fn test_unsorted_base_is_sorted_stably() {
        let base = vec![tick(120, 3), tick(0, 1), tick(60, 2), tick(60, 5)];
        let series = rehydrate(base, Vec::new());

        let times: Vec<_> = series.iter().map(|t| t.time).collect();
        assert_eq!(times, vec![0, 60, 60, 120]);
        assert_eq!(series[1].close, Decimal::from(2_i64));
        assert_eq!(series[2].close, Decimal::from(5_i64));
    }

    #[test]
    fn test_same_second_ticks_survive_replay() {
        let interval = Interval::MINUTE_1;
        let history = vec![tick(600, 1), tick(600, 2), tick(630, 3)];

        let series = rehydrate(history.clone(), Vec::new());
        assert_eq!(series, history);
        assert_eq!(aggregate(&series, interval), aggregate(&history, interval));
    }

    #[test]
    fn test_buffered_equal_time_keeps_latest() {
        let series = rehydrate(
            vec![candle(0, 1)],
            vec![candle(60, 2), candle(60, 3), candle(60, 4)],
        );
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].close, Decimal::from(4_i64));
    }

    #[test]
    fn test_stale_buffer_is_dropped() {
        let base = vec![candle(0, 1), candle(60, 2)];
        let series = rehydrate(base.clone(), vec![candle(0, 9), candle(-60, 9)]);
        assert_eq!(series, base);
    }

    #[test]
    fn test_empty_base_takes_buffer() {
        let series = rehydrate(Vec::new(), vec![tick(5, 1), tick(3, 2), tick(7, 3)]);
        let times: Vec<_> = series.iter().map(|t| t.time).collect();
        assert_eq!(times, vec![5, 7]);
    }

    #[test]
    fn test_tick_log_evicts_oldest() {
        let mut log = TickLog::with_capacity(2);
        assert!(log.push(tick(1, 1)).is_none());
        assert!(log.push(tick(2, 2)).is_none());

        let evicted = log.push(tick(3, 3)).unwrap();
        assert_eq!(evicted.time, 1);
        assert_eq!(log.len(), 2);

        let times: Vec<_> = log.iter().map(|t| t.time).collect();
        assert_eq!(times, vec![2, 3]);
        assert_eq!(log.snapshot().len(), 2);

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_tick_log_capacity_floor() {
        let log = TickLog::with_capacity(0);
        assert_eq!(log.capacity(), 1);
        assert_eq!(TickLog::default().capacity(), TickLog::DEFAULT_CAPACITY);
    }
}
