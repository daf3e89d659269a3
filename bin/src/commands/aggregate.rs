//! Aggregate command implementation.
//!
//! Reads a kline payload from disk and writes the resulting candles.

use crate::display::{Format, print_summary, write_candles};
use anyhow::{Context, Result};
use candlefold_lib::prelude::*;
use std::path::Path;

/// Aggregates the kline payload in `input` at `interval`.
pub(crate) fn aggregate_file(
    input: &Path,
    interval: Interval,
    output: Option<&Path>,
    format: Format,
    min_candles: usize,
    quiet: bool,
) -> Result<()> {
    let raw = std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let payload: serde_json::Value = serde_json::from_slice(&raw)
        .with_context(|| format!("{} is not valid JSON", input.display()))?;

    let batch = decode_payload(&payload);
    if !quiet && !batch.is_clean() {
        eprintln!(
            "Skipped {} of {} records",
            batch.rejected.len(),
            batch.batch_size()
        );
    }

    let mut ticks = batch.ticks;
    ticks.sort_by_key(|t| t.time);

    let candles = pad_to_minimum(aggregate(&ticks, interval), interval, min_candles);
    write_candles(&candles, output, format)?;

    if !quiet {
        print_summary(&candles, interval);
    }
    Ok(())
}
