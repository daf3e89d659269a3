//! Benchmark utilities for candlefold.

use candlefold_lib::{Decimal, Tick};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generates `count` one-second ticks starting at time zero.
///
/// Prices follow a bounded random walk around 100 with two decimal places,
/// so aggregation exercises real decimal arithmetic.
pub fn synthetic_ticks(count: usize, seed: u64) -> Vec<Tick> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut close: i64 = 10_000;
    let mut ticks = Vec::with_capacity(count);

    for time in (0_i64..).take(count) {
        let open = close;
        close = (close + rng.gen_range(-25..=25)).max(100);
        let high = open.max(close) + rng.gen_range(0..=10);
        let low = (open.min(close) - rng.gen_range(0..=10)).max(1);
        let price = |cents: i64| Decimal::from(cents).checked_div(100).unwrap_or_default();

        ticks.push(
            Tick::new(
                time,
                price(open),
                price(high),
                price(low),
                price(close),
                Decimal::from(rng.gen_range(1_i64..=500)),
            )
            .with_trades(rng.gen_range(1..=40)),
        );
    }

    ticks
}

/// Splits `ticks` into a reloaded base and a buffer of live ticks.
///
/// The last `live` ticks become the buffer; every tenth of them is moved
/// back in time so replay has stale entries to drop.
pub fn split_live(mut ticks: Vec<Tick>, live: usize) -> (Vec<Tick>, Vec<Tick>) {
    let at = ticks.len().saturating_sub(live);
    let mut buffered = ticks.split_off(at);
    for (i, tick) in buffered.iter_mut().enumerate() {
        if i % 10 == 9 {
            tick.time -= 30;
        }
    }
    (ticks, buffered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_ticks_are_sorted_and_consistent() {
        let ticks = synthetic_ticks(500, 7);
        assert_eq!(ticks.len(), 500);
        assert!(ticks.windows(2).all(|w| w[0].time < w[1].time));
        assert!(ticks.iter().all(Tick::is_consistent));
    }

    #[test]
    fn test_split_live() {
        let (base, live) = split_live(synthetic_ticks(100, 1), 20);
        assert_eq!(base.len(), 80);
        assert_eq!(live.len(), 20);
        assert_eq!(live[9].time, 89 - 30);
    }
}
