//! Session actor: serializes history reloads and live ticks onto one state.

use candlefold_aggregate::Candle;
use candlefold_fetch::{HistoricalSource, LiveFeed};
use candlefold_types::{CandlefoldError, Interval, Result, Tick};
use futures::StreamExt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{RenderSink, SessionConfig, SessionState};

#[derive(Debug)]
enum Command {
    Tick(Tick),
    SwitchInterval(Interval),
    Snapshot(oneshot::Sender<Vec<Candle>>),
}

/// Entry point for running a chart session.
#[derive(Debug, Clone, Copy)]
pub struct ChartSession;

impl ChartSession {
    /// Spawns a session on the current tokio runtime.
    ///
    /// The session loads history for `config.interval` first, then applies
    /// live ticks and handle commands strictly in the order they were
    /// queued. The feed is forwarded into a bounded queue, so a slow sink
    /// slows the feed rather than dropping ticks.
    pub fn spawn<H, F, S>(config: SessionConfig, source: H, feed: F, sink: S) -> SessionHandle
    where
        H: HistoricalSource + 'static,
        F: LiveFeed,
        S: RenderSink,
    {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let token = CancellationToken::new();

        let forwarder = tokio::spawn(forward_feed(feed, tx.clone(), token.clone()));
        let actor = tokio::spawn(run(config, source, sink, rx, token.clone()));

        SessionHandle {
            tx,
            token,
            actor,
            forwarder,
        }
    }
}

/// Handle to a running session.
#[derive(Debug)]
pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
    token: CancellationToken,
    actor: JoinHandle<SessionState>,
    forwarder: JoinHandle<()>,
}

impl SessionHandle {
    /// Queues a live tick behind everything already queued.
    ///
    /// # Errors
    ///
    /// Returns [`CandlefoldError::SessionClosed`] if the session has stopped.
    pub async fn send_tick(&self, tick: Tick) -> Result<()> {
        self.send(Command::Tick(tick)).await
    }

    /// Switches to `interval`, reloading history and replaying logged ticks.
    ///
    /// If the reload fails the session keeps its current interval and series.
    ///
    /// # Errors
    ///
    /// Returns [`CandlefoldError::SessionClosed`] if the session has stopped.
    pub async fn switch_interval(&self, interval: Interval) -> Result<()> {
        self.send(Command::SwitchInterval(interval)).await
    }

    /// Returns the candle series once every earlier command has been applied.
    ///
    /// # Errors
    ///
    /// Returns [`CandlefoldError::SessionClosed`] if the session has stopped.
    pub async fn snapshot(&self) -> Result<Vec<Candle>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot(reply)).await?;
        rx.await.map_err(|_| CandlefoldError::SessionClosed)
    }

    /// Stops the session. Queued commands are discarded.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Returns the token that stops the session when cancelled.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Returns true once the session has stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.actor.is_finished()
    }

    /// Waits for the session to stop and returns its final state.
    ///
    /// The session stops when [`SessionHandle::shutdown`] is called or when
    /// the live feed ends, after draining what was queued.
    ///
    /// # Errors
    ///
    /// Returns [`CandlefoldError::SessionClosed`] if the session task panicked.
    pub async fn join(self) -> Result<SessionState> {
        let Self {
            tx,
            token,
            actor,
            forwarder,
        } = self;
        drop(tx);

        let state = actor.await.map_err(|e| {
            error!(error = %e, "session task failed");
            CandlefoldError::SessionClosed
        })?;

        token.cancel();
        if let Err(e) = forwarder.await {
            warn!(error = %e, "feed forwarder failed");
        }
        Ok(state)
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| CandlefoldError::SessionClosed)
    }
}

/// Pumps the live feed into the command queue until cancelled or exhausted.
async fn forward_feed<F: LiveFeed>(feed: F, tx: mpsc::Sender<Command>, token: CancellationToken) {
    let mut ticks = feed.ticks();

    loop {
        let tick = tokio::select! {
            biased;
            () = token.cancelled() => break,
            next = ticks.next() => match next {
                Some(tick) => tick,
                None => {
                    debug!("live feed ended");
                    break;
                }
            },
        };

        if tx.send(Command::Tick(tick)).await.is_err() {
            break;
        }
    }
}

/// The actor loop.
async fn run<H, S>(
    config: SessionConfig,
    source: H,
    mut sink: S,
    mut rx: mpsc::Receiver<Command>,
    token: CancellationToken,
) -> SessionState
where
    H: HistoricalSource,
    S: RenderSink,
{
    let mut state = SessionState::new(&config);
    info!(interval = %state.interval(), "session started");
    reload(&mut state, config.interval, &source, &mut sink, &token).await;

    loop {
        let command = tokio::select! {
            biased;
            () = token.cancelled() => break,
            command = rx.recv() => match command {
                Some(command) => command,
                None => break,
            },
        };

        match command {
            Command::Tick(tick) => {
                state.apply_tick(tick, &mut sink);
            }
            Command::SwitchInterval(interval) => {
                debug!(from = %state.interval(), to = %interval, "switching interval");
                reload(&mut state, interval, &source, &mut sink, &token).await;
            }
            Command::Snapshot(reply) => {
                // The requester may have given up; nothing to do then
                let _ = reply.send(state.snapshot());
            }
        }
    }

    info!(candles = state.candles().len(), "session stopped");
    state
}

/// Loads history for `interval` and rebuilds the state from it.
///
/// On fetch failure the state, including its interval, is left as it was.
async fn reload<H, S>(
    state: &mut SessionState,
    interval: Interval,
    source: &H,
    sink: &mut S,
    token: &CancellationToken,
) where
    H: HistoricalSource + ?Sized,
    S: RenderSink + ?Sized,
{
    let fetched = tokio::select! {
        biased;
        () = token.cancelled() => return,
        fetched = source.fetch_ticks(interval) => fetched,
    };

    match fetched {
        Ok(history) => {
            state.set_interval(interval);
            state.reload(history, sink);
        }
        Err(e) => {
            error!(%interval, error = %e, "history fetch failed, keeping current series");
        }
    }
}
