//! Fetch command implementation.
//!
//! Pulls kline history from the API, aggregates it and writes the candles.

use crate::display::{Format, print_summary, write_candles};
use anyhow::{Context, Result};
use candlefold_lib::ClientConfig;
use candlefold_lib::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Fetches history for `interval` and writes the aggregated candles.
pub(crate) async fn fetch(
    config: ClientConfig,
    interval: Interval,
    output: Option<&Path>,
    format: Format,
    min_candles: usize,
    quiet: bool,
) -> Result<()> {
    let base_url = config.base_url.clone();
    let pair_id = config.pair_id;
    let client = KlineClient::new(config).context("Failed to build HTTP client")?;

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .context("Invalid progress template")?,
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("pair {pair_id} {interval} from {base_url}"));
        pb
    };

    let ticks = match client.fetch_ticks(interval).await {
        Ok(ticks) => ticks,
        Err(e) => {
            progress.abandon_with_message("Fetch failed");
            return Err(e).with_context(|| format!("Failed to fetch klines from {base_url}"));
        }
    };
    progress.finish_with_message(format!("Fetched {} ticks", ticks.len()));

    let candles = pad_to_minimum(aggregate(&ticks, interval), interval, min_candles);
    write_candles(&candles, output, format)?;

    if !quiet {
        print_summary(&candles, interval);
        if let Some(path) = output {
            println!("Output written to: {}", path.display());
        }
    }
    Ok(())
}
