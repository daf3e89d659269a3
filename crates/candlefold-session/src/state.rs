//! Synchronous session core.

use candlefold_aggregate::{
    Candle, MergeOutcome, SeriesState, TickLog, aggregate, open_candle, pad_to_minimum, rehydrate,
};
use candlefold_types::{Interval, Tick};
use tracing::{debug, error, info};

use crate::{RenderSink, SessionConfig};

/// Tick and candle series for one chart, plus the live tick log.
///
/// Every mutation goes through a [`RenderSink`]; the candle series only
/// advances once the sink has accepted the update.
#[derive(Debug)]
pub struct SessionState {
    interval: Interval,
    min_visible: usize,
    log: TickLog,
    ticks: SeriesState<Tick>,
    candles: SeriesState<Candle>,
}

impl SessionState {
    /// Creates an empty state for `config`.
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            interval: config.interval,
            min_visible: config.min_visible_candles,
            log: TickLog::with_capacity(config.tick_log_capacity),
            ticks: SeriesState::new(),
            candles: SeriesState::new(),
        }
    }

    /// Returns the current interval.
    #[must_use]
    pub const fn interval(&self) -> Interval {
        self.interval
    }

    /// Sets the interval used by the next [`SessionState::reload`].
    pub const fn set_interval(&mut self, interval: Interval) {
        self.interval = interval;
    }

    /// Returns the current candle series.
    #[must_use]
    pub fn candles(&self) -> &[Candle] {
        self.candles.items()
    }

    /// Returns the current tick series.
    #[must_use]
    pub fn ticks(&self) -> &[Tick] {
        self.ticks.items()
    }

    /// Returns the live tick log.
    #[must_use]
    pub const fn tick_log(&self) -> &TickLog {
        &self.log
    }

    /// Rebuilds both series from freshly loaded history.
    ///
    /// Buffered live ticks are replayed over `history`, the result is
    /// aggregated at the current interval and padded to the minimum
    /// visible count, then handed to the sink. A sink failure is logged;
    /// the state is reset either way so the next reload starts clean.
    pub fn reload<S: RenderSink + ?Sized>(&mut self, history: Vec<Tick>, sink: &mut S) {
        let loaded = history.len();
        let merged = rehydrate(history, self.log.iter().cloned());
        let candles = pad_to_minimum(aggregate(&merged, self.interval), self.interval, self.min_visible);

        info!(
            interval = %self.interval,
            loaded,
            replayed = self.log.len(),
            candles = candles.len(),
            "reloaded series"
        );

        if let Err(e) = sink.set_data(&candles) {
            error!(interval = %self.interval, error = %e, "render reload failed");
        }

        self.ticks = SeriesState::from_series(merged);
        self.candles = SeriesState::from_series(candles);
    }

    /// Merges one live tick.
    ///
    /// The tick is logged for replay, merged into the tick series and, if
    /// accepted, its bucket's candle is rebuilt from the trailing ticks and
    /// merged into the candle series through the sink.
    pub fn apply_tick<S: RenderSink + ?Sized>(&mut self, tick: Tick, sink: &mut S) -> MergeOutcome {
        let bucket = self.interval.bucket(tick.time);
        if let Some(evicted) = self.log.push(tick.clone()) {
            debug!(evicted = evicted.time, "tick log full");
        }

        let outcome = self.ticks.apply(tick);
        if !outcome.is_applied() {
            return outcome;
        }

        match open_candle(self.ticks.items(), self.interval, bucket) {
            Some(candle) => self.candles.apply_with(candle, |c| sink.update(c)),
            None => outcome,
        }
    }

    /// Returns a copy of the candle series.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Candle> {
        self.candles.items().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordingSink;
    use candlefold_types::Decimal;

    fn tick(time: i64, close: i64, volume: i64) -> Tick {
        let c = Decimal::from(close);
        Tick::new(time, c.clone(), c.clone(), c.clone(), c, Decimal::from(volume))
    }

    fn config(interval: Interval, min_visible: usize) -> SessionConfig {
        SessionConfig::default()
            .with_interval(interval)
            .with_min_visible_candles(min_visible)
    }

    #[test]
    fn test_reload_aggregates_and_pads() {
        let mut state = SessionState::new(&config(Interval::MINUTE_1, 5));
        let mut sink = RecordingSink::new();

        state.reload(vec![tick(600, 1, 1), tick(630, 2, 1), tick(660, 3, 1)], &mut sink);

        let shown = sink.last_data().unwrap();
        assert_eq!(shown.len(), 5);
        assert!(shown[..3].iter().all(Candle::is_placeholder));
        assert_eq!(shown[3].time, 600);
        assert_eq!(shown[3].close, Decimal::from(2_i64));
        assert_eq!(shown[4].time, 660);
        assert_eq!(state.snapshot(), shown);
    }

    #[test]
    fn test_reload_keeps_same_second_ticks() {
        let mut state = SessionState::new(&config(Interval::MINUTE_1, 0));
        let mut sink = RecordingSink::new();
        let history = vec![tick(600, 1, 5), tick(600, 2, 7), tick(630, 3, 1)];

        state.reload(history.clone(), &mut sink);

        let candles = state.snapshot();
        assert_eq!(candles, aggregate(&history, Interval::MINUTE_1));
        assert_eq!(candles[0].open, Decimal::from(1_i64));
        assert_eq!(candles[0].low, Decimal::from(1_i64));
        assert_eq!(candles[0].volume, Decimal::from(13_i64));
        assert_eq!(state.ticks().len(), 3);
    }

    #[test]
    fn test_live_tick_replaces_open_candle() {
        let mut state = SessionState::new(&config(Interval::MINUTE_1, 0));
        let mut sink = RecordingSink::new();
        state.reload(vec![tick(600, 1, 1), tick(660, 3, 1)], &mut sink);

        let outcome = state.apply_tick(tick(670, 5, 2), &mut sink);
        assert_eq!(outcome, MergeOutcome::Replaced);

        let candles = state.candles();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[1].open, Decimal::from(3_i64));
        assert_eq!(candles[1].close, Decimal::from(5_i64));
        assert_eq!(candles[1].high, Decimal::from(5_i64));
        assert_eq!(candles[1].volume, Decimal::from(3_i64));
        assert_eq!(sink.updates(), vec![candles[1].clone()]);
    }

    #[test]
    fn test_live_tick_opens_new_candle() {
        let mut state = SessionState::new(&config(Interval::MINUTE_1, 0));
        let mut sink = RecordingSink::new();
        state.reload(vec![tick(600, 1, 1)], &mut sink);

        let outcome = state.apply_tick(tick(725, 4, 1), &mut sink);
        assert_eq!(outcome, MergeOutcome::Appended);
        assert_eq!(state.candles().len(), 2);
        assert_eq!(state.candles()[1].time, 720);
    }

    #[test]
    fn test_stale_tick_is_dropped() {
        let mut state = SessionState::new(&config(Interval::MINUTE_1, 0));
        let mut sink = RecordingSink::new();
        state.reload(vec![tick(600, 1, 1), tick(660, 3, 1)], &mut sink);

        let outcome = state.apply_tick(tick(610, 9, 1), &mut sink);
        assert!(!outcome.is_applied());
        assert!(sink.updates().is_empty());
        assert_eq!(state.candles()[0].close, Decimal::from(1_i64));
    }

    #[test]
    fn test_render_failure_keeps_candles() {
        let mut state = SessionState::new(&config(Interval::MINUTE_1, 0));
        let mut sink = RecordingSink::new();
        state.reload(vec![tick(600, 1, 1)], &mut sink);

        sink.fail_updates(true);
        let outcome = state.apply_tick(tick(660, 2, 1), &mut sink);
        assert_eq!(outcome, MergeOutcome::RenderFailed { incoming: 660 });
        assert_eq!(state.candles().len(), 1);

        // The next tick in that bucket appends once the sink recovers
        sink.fail_updates(false);
        let outcome = state.apply_tick(tick(665, 3, 1), &mut sink);
        assert_eq!(outcome, MergeOutcome::Appended);
        assert_eq!(state.candles()[1].open, Decimal::from(2_i64));
        assert_eq!(state.candles()[1].close, Decimal::from(3_i64));
    }

    #[test]
    fn test_interval_switch_replays_live_ticks() {
        let mut state = SessionState::new(&config(Interval::from_seconds(10).unwrap(), 0));
        let mut sink = RecordingSink::new();
        state.reload(vec![tick(100, 10, 1)], &mut sink);

        state.apply_tick(tick(100, 12, 1), &mut sink);
        state.apply_tick(tick(110, 15, 1), &mut sink);
        state.apply_tick(tick(90, 5, 1), &mut sink);

        // History reloaded without the live ticks; the log restores them
        state.set_interval(Interval::from_seconds(10).unwrap());
        state.reload(vec![tick(100, 10, 1)], &mut sink);

        let candles = state.snapshot();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].time, 100);
        assert_eq!(candles[0].close, Decimal::from(12_i64));
        assert_eq!(candles[1].time, 110);
        assert_eq!(candles[1].close, Decimal::from(15_i64));
    }
}
