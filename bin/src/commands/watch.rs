//! Watch command implementation.
//!
//! Runs a live chart session and streams every rendered candle to stdout.

use anyhow::{Context, Result};
use candlefold_lib::{
    ChartSession, ClientConfig, HistoricalSource, Interval, KlineClient, MockConfig, MockFeed,
    MockHistory, SessionConfig, SessionHandle, WriterSink,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Options for a watch run.
pub(crate) struct WatchOptions {
    pub(crate) http: bool,
    pub(crate) interval: Option<Interval>,
    pub(crate) duration: Option<Duration>,
    pub(crate) config: Option<PathBuf>,
    pub(crate) base_url: String,
    pub(crate) pair_id: u32,
    pub(crate) seed: u64,
    pub(crate) skip_placeholders: bool,
}

/// Runs a session until Ctrl+C or the requested duration elapses.
pub(crate) async fn watch(options: WatchOptions) -> Result<()> {
    let mut config = match &options.config {
        Some(path) => SessionConfig::from_json_file(path)
            .with_context(|| format!("Failed to load session config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(interval) = options.interval {
        config = config.with_interval(interval);
    }

    let mock = MockConfig {
        seed: options.seed,
        ..MockConfig::default()
    };
    let sink = WriterSink::new(std::io::stdout()).with_skip_placeholders(options.skip_placeholders);

    let handle = if options.http {
        let client = KlineClient::new(
            ClientConfig::default()
                .with_base_url(options.base_url.clone())
                .with_pair_id(options.pair_id),
        )
        .context("Failed to build HTTP client")?;

        // The simulated feed continues from the last real close
        let mut feed = MockFeed::new(&mock);
        match client.fetch_ticks(config.interval).await {
            Ok(ticks) => {
                if let Some(last) = ticks.last() {
                    feed = feed.starting_at(&last.close);
                }
            }
            Err(e) => warn!(error = %e, "could not seed live feed from history"),
        }
        spawn(config, client, feed, sink)
    } else {
        let history = MockHistory::new(mock);
        let feed = history.live_feed();
        spawn(config, history, feed, sink)
    };

    match options.duration {
        Some(limit) => {
            tokio::select! {
                () = tokio::time::sleep(limit) => info!("watch duration elapsed"),
                res = tokio::signal::ctrl_c() => res.context("Failed to listen for Ctrl+C")?,
            }
        }
        None => tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl+C")?,
    }

    handle.shutdown();
    let state = handle.join().await?;
    info!(
        interval = %state.interval(),
        candles = state.candles().len(),
        logged_ticks = state.tick_log().len(),
        "watch finished"
    );
    Ok(())
}

fn spawn<H: HistoricalSource + 'static>(
    config: SessionConfig,
    source: H,
    feed: MockFeed,
    sink: WriterSink<std::io::Stdout>,
) -> SessionHandle {
    info!(interval = %config.interval, "starting session");
    ChartSession::spawn(config, source, feed, sink)
}
