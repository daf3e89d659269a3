//! Seeded random-walk history and live feed for running without an API.

use std::time::Duration;

use async_trait::async_trait;
use candlefold_types::{Decimal, Interval, RawKline, Tick};
use chrono::Utc;
use futures::stream::{self, BoxStream, StreamExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::MissedTickBehavior;

use crate::FetchError;
use crate::source::{HistoricalSource, LiveFeed};

/// Configuration for the mock generators.
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Price of the first generated tick.
    pub start_price: u32,
    /// Noise multiplier; `1.0` is a calm market.
    pub volatility: f64,
    /// Seconds between generated history ticks.
    pub tick_spacing_secs: u32,
    /// Number of history ticks.
    pub history_len: usize,
    /// Delay between live ticks.
    pub feed_period: Duration,
    /// RNG seed.
    pub seed: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            start_price: 50_000,
            volatility: 1.0,
            tick_spacing_secs: 1,
            history_len: 7_200,
            feed_period: Duration::from_secs(1),
            seed: 42,
        }
    }
}

/// Random-walk tick generator.
///
/// Works in the wire's scaled-integer space so generated values are exact
/// decimals once normalized. Each tick opens at the previous close, drifts
/// with a trend that flips every few dozen ticks and gets asymmetric wicks.
#[derive(Debug, Clone)]
struct RandomWalk {
    rng: StdRng,
    close: i64,
    volatility: f64,
    trend: f64,
    trend_left: u32,
}

impl RandomWalk {
    fn new(start_price: u32, volatility: f64, seed: u64) -> Self {
        let scale = i64::from(RawKline::SCALE.get());
        Self {
            rng: StdRng::seed_from_u64(seed),
            close: i64::from(start_price.max(1)) * scale,
            volatility,
            trend: 1.0,
            trend_left: 0,
        }
    }

    fn next_tick(&mut self, time: i64) -> Tick {
        if self.trend_left == 0 {
            self.trend = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            self.trend_left = self.rng.gen_range(20..80);
        }
        self.trend_left -= 1;

        let big_move = self.rng.gen_bool(0.05);
        let mut change = self.trend * 0.0008 * if big_move { 3.0 } else { 1.0 };
        change += self.rng.gen_range(-0.5..0.5) * self.volatility * 0.002;
        if big_move {
            change += self.rng.gen_range(-0.5..0.5) * self.volatility * 0.005;
        }

        let open = self.close;
        let close = scale_price(open, change).max(1);

        let wick = match self.rng.gen_range(0.0..1.0) {
            w if w < 0.3 => self.rng.gen_range(0.0005..0.0015),
            w if w < 0.7 => self.rng.gen_range(0.002..0.005),
            w if w < 0.9 => self.rng.gen_range(0.005..0.013),
            _ => self.rng.gen_range(0.01..0.025),
        };
        let upper = self.rng.gen_range(0.0..wick);
        let lower = self.rng.gen_range(0.0..wick);
        let high = scale_price(open.max(close), upper);
        let low = scale_price(open.min(close), -lower).max(1);

        let volume_units = match self.rng.gen_range(0.0..1.0) {
            v if v < 0.6 => self.rng.gen_range(1.0..6.0),
            v if v < 0.9 => self.rng.gen_range(5.0..20.0),
            _ => self.rng.gen_range(15.0..45.0),
        };
        let volume = scale_price(i64::from(RawKline::SCALE.get()), volume_units - 1.0);

        self.close = close;
        RawKline {
            high,
            low,
            open,
            close,
            mark: close,
            volume,
            trades: self.rng.gen_range(10..90),
            timestamp_ms: time.saturating_mul(1000),
        }
        .normalize()
    }
}

/// Returns `raw * (1 + change)` rounded to the nearest scaled unit.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn scale_price(raw: i64, change: f64) -> i64 {
    (raw as f64 * (1.0 + change)).round() as i64
}

/// Mock history source.
///
/// The price path is generated once from the seed; each fetch stamps it so
/// the last tick lands on the current second.
#[derive(Debug, Clone)]
pub struct MockHistory {
    config: MockConfig,
    ticks: Vec<Tick>,
    walk: RandomWalk,
}

impl MockHistory {
    /// Generates the history for `config`.
    #[must_use]
    pub fn new(config: MockConfig) -> Self {
        let mut walk = RandomWalk::new(config.start_price, config.volatility, config.seed);
        let spacing = i64::from(config.tick_spacing_secs.max(1));
        let len = i64::try_from(config.history_len).unwrap_or(i64::MAX);

        // Times are offsets ending at zero; shifted to wall clock on fetch
        let ticks = (0..len)
            .map(|i| walk.next_tick((i - len + 1) * spacing))
            .collect();
        Self {
            config,
            ticks,
            walk,
        }
    }

    /// Returns a live feed that continues the price path of this history.
    #[must_use]
    pub fn live_feed(&self) -> MockFeed {
        MockFeed {
            walk: self.walk.clone(),
            period: self.config.feed_period,
        }
    }

    /// Returns the generator configuration.
    #[must_use]
    pub const fn config(&self) -> &MockConfig {
        &self.config
    }

    /// Returns the history stamped to end at `now`.
    #[must_use]
    pub fn ticks_at(&self, now: i64) -> Vec<Tick> {
        self.ticks
            .iter()
            .map(|tick| Tick {
                time: tick.time.saturating_add(now),
                ..tick.clone()
            })
            .collect()
    }
}

#[async_trait]
impl HistoricalSource for MockHistory {
    async fn fetch_ticks(&self, _interval: Interval) -> Result<Vec<Tick>, FetchError> {
        Ok(self.ticks_at(Utc::now().timestamp()))
    }
}

/// Mock live feed emitting one tick per period, stamped with wall-clock time.
#[derive(Debug, Clone)]
pub struct MockFeed {
    walk: RandomWalk,
    period: Duration,
}

impl MockFeed {
    /// Creates a standalone feed.
    #[must_use]
    pub fn new(config: &MockConfig) -> Self {
        Self {
            walk: RandomWalk::new(config.start_price, config.volatility, config.seed),
            period: config.feed_period,
        }
    }

    /// Continues the walk from `price`, typically the last loaded close.
    ///
    /// A price that is not positive or does not fit the wire scale is
    /// ignored.
    #[must_use]
    pub fn starting_at(mut self, price: &Decimal) -> Self {
        match price.to_scaled(RawKline::SCALE) {
            Some(close) if close > 0 => self.walk.close = close,
            _ => {}
        }
        self
    }
}

impl LiveFeed for MockFeed {
    fn ticks(self) -> BoxStream<'static, Tick> {
        let period = self.period.max(Duration::from_millis(1));

        // The timer is created on first poll so it binds to the polling runtime
        stream::unfold((None, self.walk), move |(timer, mut walk)| async move {
            let mut timer = timer.unwrap_or_else(|| {
                let mut timer = tokio::time::interval(period);
                timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
                timer
            });
            timer.tick().await;
            let tick = walk.next_tick(Utc::now().timestamp());
            Some((tick, (Some(timer), walk)))
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> MockConfig {
        MockConfig {
            history_len: 200,
            feed_period: Duration::from_millis(5),
            ..MockConfig::default()
        }
    }

    #[test]
    fn test_walk_is_deterministic() {
        let a = MockHistory::new(small_config()).ticks_at(0);
        let b = MockHistory::new(small_config()).ticks_at(0);
        assert_eq!(a, b);

        let other = MockHistory::new(MockConfig {
            seed: 7,
            ..small_config()
        });
        assert_ne!(a, other.ticks_at(0));
    }

    #[test]
    fn test_history_shape() {
        let ticks = MockHistory::new(small_config()).ticks_at(1_000);
        assert_eq!(ticks.len(), 200);
        assert_eq!(ticks.last().unwrap().time, 1_000);
        assert_eq!(ticks[0].time, 801);
        assert!(ticks.windows(2).all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn test_ticks_are_consistent() {
        let ticks = MockHistory::new(small_config()).ticks_at(0);
        for pair in ticks.windows(2) {
            assert_eq!(pair[1].open, pair[0].close);
        }
        for tick in &ticks {
            assert!(tick.is_consistent(), "inconsistent tick: {tick:?}");
            assert!((10..90).contains(&tick.trades));
            assert!(!tick.volume.is_zero());
        }
    }

    #[tokio::test]
    async fn test_live_feed_continues_history() {
        let history = MockHistory::new(small_config());
        let last_close = history.ticks_at(0).last().unwrap().close.clone();

        let ticks: Vec<_> = history.live_feed().ticks().take(3).collect().await;
        assert_eq!(ticks.len(), 3);
        assert_eq!(ticks[0].open, last_close);
    }

    #[tokio::test]
    async fn test_feed_starting_at_loaded_close() {
        let close: Decimal = "1.2345".parse().unwrap();
        let feed = MockFeed::new(&small_config()).starting_at(&close);

        let ticks: Vec<_> = feed.ticks().take(2).collect().await;
        assert_eq!(ticks[0].open, close);
        assert_eq!(ticks[1].open, ticks[0].close);
    }

    #[tokio::test]
    async fn test_feed_ignores_unusable_start() {
        let feed = MockFeed::new(&small_config()).starting_at(&Decimal::zero());

        let ticks: Vec<_> = feed.ticks().take(1).collect().await;
        assert_eq!(ticks[0].open, Decimal::from(50_000_i64));
    }
}
