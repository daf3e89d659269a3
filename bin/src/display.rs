//! Display utilities and output formatting for the candlefold CLI.

use anyhow::{Context, Result};
use candlefold_lib::prelude::*;
use clap::ValueEnum;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Output format for candles.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum Format {
    Csv,
    Tsv,
    Json,
    Ndjson,
}

/// Writes candles to `output`, or to stdout when no path is given.
pub(crate) fn write_candles(candles: &[Candle], output: Option<&Path>, format: Format) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_with(candles, &mut writer, format)?;
            writer.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            write_with(candles, &mut writer, format)?;
            writer.flush()?;
        }
    }
    Ok(())
}

fn write_with<W: Write>(candles: &[Candle], writer: W, format: Format) -> Result<()> {
    match format {
        Format::Csv => CsvFormatter::new().write_candles(candles, writer)?,
        Format::Tsv => CsvFormatter::tsv().write_candles(candles, writer)?,
        Format::Json => JsonFormatter::new().write_candles(candles, writer)?,
        Format::Ndjson => JsonFormatter::ndjson().write_candles(candles, writer)?,
    }
    Ok(())
}

/// Prints a one-line summary of a candle series to stderr.
pub(crate) fn print_summary(candles: &[Candle], interval: Interval) {
    let real = candles.iter().filter(|c| !c.is_placeholder()).count();
    let change = candlefold_lib::price_change_percent(candles)
        .map_or_else(|| "n/a".to_string(), |pct| format!("{pct:+.2}%"));
    eprintln!(
        "{} candles at {} ({} with data), change {}",
        candles.len(),
        interval,
        real,
        change
    );
}
