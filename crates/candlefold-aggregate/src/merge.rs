//! Incremental merge of live updates into an ordered series.

use std::cmp::Ordering;
use std::fmt;

use candlefold_types::Tick;
use tracing::{error, trace, warn};

use crate::Candle;

/// A value positioned in time by a bucket timestamp.
pub trait Timestamped {
    /// Returns the bucket time in Unix seconds.
    fn time(&self) -> i64;
}

impl Timestamped for Tick {
    fn time(&self) -> i64 {
        self.time
    }
}

impl Timestamped for Candle {
    fn time(&self) -> i64 {
        self.time
    }
}

/// What an incoming update does to a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeAction {
    /// Starts a new element after the last one.
    Append,
    /// Replaces the last element in place.
    Replace,
    /// Older than the last element; dropped.
    Reject {
        /// Bucket time of the current last element.
        last: i64,
    },
}

impl MergeAction {
    /// Classifies an update at `incoming` against the last bucket time.
    #[must_use]
    pub fn classify(last_bucket_time: Option<i64>, incoming: i64) -> Self {
        match last_bucket_time {
            None => Self::Append,
            Some(last) => match incoming.cmp(&last) {
                Ordering::Less => Self::Reject { last },
                Ordering::Equal => Self::Replace,
                Ordering::Greater => Self::Append,
            },
        }
    }
}

/// Result of applying one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// A new element was appended.
    Appended,
    /// The last element was replaced.
    Replaced,
    /// The update was older than the last element and dropped.
    Rejected {
        /// Bucket time of the dropped update.
        incoming: i64,
        /// Bucket time of the last element.
        last: i64,
    },
    /// The render adapter failed; the series was left untouched.
    RenderFailed {
        /// Bucket time of the update that failed to render.
        incoming: i64,
    },
}

impl MergeOutcome {
    /// Returns true if the series changed.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Appended | Self::Replaced)
    }
}

/// An ordered series plus the last bucket time used to merge into it.
///
/// Only the last element can ever change. An update older than the last
/// bucket time is dropped, an equal one replaces the last element with the
/// incoming snapshot, and a newer one is appended.
#[derive(Debug, Clone)]
pub struct SeriesState<T> {
    items: Vec<T>,
    last_bucket_time: Option<i64>,
}

impl<T> Default for SeriesState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            last_bucket_time: None,
        }
    }
}

impl<T: Timestamped> SeriesState<T> {
    /// Creates an empty series.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes over an already ordered, duplicate-free series.
    #[must_use]
    pub fn from_series(items: Vec<T>) -> Self {
        let last_bucket_time = items.last().map(Timestamped::time);
        Self {
            items,
            last_bucket_time,
        }
    }

    /// Returns the series.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consumes the state, returning the series.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Returns the bucket time of the last element.
    #[must_use]
    pub const fn last_bucket_time(&self) -> Option<i64> {
        self.last_bucket_time
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the series is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Applies one update.
    ///
    /// Stale updates are logged at `warn` and dropped.
    pub fn apply(&mut self, incoming: T) -> MergeOutcome {
        let time = incoming.time();
        match MergeAction::classify(self.last_bucket_time, time) {
            MergeAction::Reject { last } => {
                warn!(incoming = time, last, "dropping out-of-order update");
                MergeOutcome::Rejected {
                    incoming: time,
                    last,
                }
            }
            action => self.commit(action, incoming),
        }
    }

    /// Applies one update after transcribing it to a render adapter.
    ///
    /// `transcribe` runs before the series is touched. If it fails the
    /// error is logged, the series and last bucket time stay as they were
    /// and [`MergeOutcome::RenderFailed`] is returned.
    pub fn apply_with<F, E>(&mut self, incoming: T, transcribe: F) -> MergeOutcome
    where
        F: FnOnce(&T) -> Result<(), E>,
        E: fmt::Display,
    {
        let time = incoming.time();
        let action = MergeAction::classify(self.last_bucket_time, time);
        if let MergeAction::Reject { last } = action {
            warn!(incoming = time, last, "dropping out-of-order update");
            return MergeOutcome::Rejected {
                incoming: time,
                last,
            };
        }

        if let Err(err) = transcribe(&incoming) {
            error!(
                incoming = time,
                last_bucket_time = ?self.last_bucket_time,
                error = %err,
                "render update failed"
            );
            return MergeOutcome::RenderFailed { incoming: time };
        }

        self.commit(action, incoming)
    }

    /// Writes an accepted update into the series.
    pub(crate) fn commit(&mut self, action: MergeAction, incoming: T) -> MergeOutcome {
        let time = incoming.time();
        match action {
            MergeAction::Replace => {
                match self.items.last_mut() {
                    Some(last) => *last = incoming,
                    None => self.items.push(incoming),
                }
                trace!(time, "replaced last element");
                MergeOutcome::Replaced
            }
            MergeAction::Append => {
                self.items.push(incoming);
                self.last_bucket_time = Some(time);
                trace!(time, "appended element");
                MergeOutcome::Appended
            }
            MergeAction::Reject { last } => MergeOutcome::Rejected {
                incoming: time,
                last,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candlefold_types::Decimal;

    fn candle(time: i64, close: &str) -> Candle {
        let close: Decimal = close.parse().unwrap();
        Candle::new(
            time,
            close.clone(),
            close.clone(),
            close.clone(),
            close,
            Decimal::from(1_i64),
        )
    }

    fn seeded() -> SeriesState<Candle> {
        SeriesState::from_series(vec![candle(60, "1"), candle(120, "2")])
    }

    #[test]
    fn test_classify() {
        assert_eq!(MergeAction::classify(None, 5), MergeAction::Append);
        assert_eq!(MergeAction::classify(Some(10), 5), MergeAction::Reject { last: 10 });
        assert_eq!(MergeAction::classify(Some(10), 10), MergeAction::Replace);
        assert_eq!(MergeAction::classify(Some(10), 11), MergeAction::Append);
    }

    #[test]
    fn test_older_update_is_rejected() {
        let mut state = seeded();
        let before = state.items().to_vec();

        let outcome = state.apply(candle(60, "9"));
        assert_eq!(
            outcome,
            MergeOutcome::Rejected {
                incoming: 60,
                last: 120
            }
        );
        assert_eq!(state.items(), before.as_slice());
        assert_eq!(state.last_bucket_time(), Some(120));
    }

    #[test]
    fn test_equal_update_replaces_last_only() {
        let mut state = seeded();

        let outcome = state.apply(candle(120, "3"));
        assert_eq!(outcome, MergeOutcome::Replaced);
        assert_eq!(state.len(), 2);
        assert_eq!(state.items()[0], candle(60, "1"));
        assert_eq!(state.items()[1], candle(120, "3"));
        assert_eq!(state.last_bucket_time(), Some(120));
    }

    #[test]
    fn test_newer_update_appends() {
        let mut state = seeded();

        let outcome = state.apply(candle(180, "4"));
        assert_eq!(outcome, MergeOutcome::Appended);
        assert_eq!(state.len(), 3);
        assert_eq!(state.last_bucket_time(), Some(180));
    }

    #[test]
    fn test_empty_series_accepts_anything() {
        let mut state = SeriesState::new();
        assert!(state.is_empty());
        assert_eq!(state.apply(candle(-60, "1")), MergeOutcome::Appended);
        assert_eq!(state.last_bucket_time(), Some(-60));
    }

    #[test]
    fn test_render_failure_leaves_state_untouched() {
        let mut state = seeded();

        let outcome = state.apply_with(candle(180, "4"), |_| Err("chart gone"));
        assert_eq!(outcome, MergeOutcome::RenderFailed { incoming: 180 });
        assert_eq!(state.len(), 2);
        assert_eq!(state.last_bucket_time(), Some(120));

        // The same update succeeds once the adapter recovers
        let mut rendered = Vec::new();
        let outcome = state.apply_with(candle(180, "4"), |c| {
            rendered.push(c.time);
            Ok::<_, &str>(())
        });
        assert_eq!(outcome, MergeOutcome::Appended);
        assert_eq!(rendered, vec![180]);
        assert_eq!(state.last_bucket_time(), Some(180));
    }

    #[test]
    fn test_stale_update_is_not_rendered() {
        let mut state = seeded();
        let mut calls = 0;

        let outcome = state.apply_with(candle(0, "4"), |_| {
            calls += 1;
            Ok::<_, &str>(())
        });
        assert!(!outcome.is_applied());
        assert_eq!(calls, 0);
    }
}
