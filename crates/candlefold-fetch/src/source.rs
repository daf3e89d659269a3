//! Historical sources and live tick feeds.

use std::sync::Arc;

use async_trait::async_trait;
use candlefold_types::{Interval, Tick};
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::mpsc;

use crate::FetchError;

/// Anything that can load tick history for an interval.
#[async_trait]
pub trait HistoricalSource: Send + Sync {
    /// Fetches history for `interval`, sorted by time.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be loaded.
    async fn fetch_ticks(&self, interval: Interval) -> Result<Vec<Tick>, FetchError>;
}

#[async_trait]
impl<S: HistoricalSource + ?Sized> HistoricalSource for Box<S> {
    async fn fetch_ticks(&self, interval: Interval) -> Result<Vec<Tick>, FetchError> {
        (**self).fetch_ticks(interval).await
    }
}

#[async_trait]
impl<S: HistoricalSource + ?Sized> HistoricalSource for Arc<S> {
    async fn fetch_ticks(&self, interval: Interval) -> Result<Vec<Tick>, FetchError> {
        (**self).fetch_ticks(interval).await
    }
}

/// A source of live ticks.
pub trait LiveFeed: Send + 'static {
    /// Turns the feed into a stream of ticks, in arrival order.
    fn ticks(self) -> BoxStream<'static, Tick>;
}

/// A live feed driven through an mpsc channel.
///
/// Useful for embedding candlefold behind an existing transport.
#[derive(Debug)]
pub struct ChannelFeed {
    rx: mpsc::Receiver<Tick>,
}

impl ChannelFeed {
    /// Creates a feed and the sender that drives it.
    #[must_use]
    pub fn channel(capacity: usize) -> (mpsc::Sender<Tick>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self { rx })
    }

    /// Wraps an existing receiver.
    #[must_use]
    pub const fn new(rx: mpsc::Receiver<Tick>) -> Self {
        Self { rx }
    }
}

impl LiveFeed for ChannelFeed {
    fn ticks(self) -> BoxStream<'static, Tick> {
        stream::unfold(self.rx, |mut rx| async move {
            let tick = rx.recv().await?;
            Some((tick, rx))
        })
        .boxed()
    }
}

/// A feed that never produces a tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeed;

impl LiveFeed for NoFeed {
    fn ticks(self) -> BoxStream<'static, Tick> {
        stream::pending().boxed()
    }
}

/// A fixed in-memory history.
#[derive(Debug, Clone, Default)]
pub struct StaticHistory {
    ticks: Vec<Tick>,
}

impl StaticHistory {
    /// Creates a source that always returns `ticks`, sorted by time.
    #[must_use]
    pub fn new(mut ticks: Vec<Tick>) -> Self {
        ticks.sort_by_key(|tick| tick.time);
        Self { ticks }
    }
}

#[async_trait]
impl HistoricalSource for StaticHistory {
    async fn fetch_ticks(&self, _interval: Interval) -> Result<Vec<Tick>, FetchError> {
        Ok(self.ticks.clone())
    }
}
