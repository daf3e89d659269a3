//! CSV output format.

use candlefold_aggregate::Candle;
use candlefold_types::Tick;
use chrono::DateTime;
use std::io::Write;

use crate::{FormatError, Formatter};

/// CSV formatter.
///
/// Each row carries the Unix time and its UTC rendering, followed by the
/// exact decimal values.
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    /// Field delimiter (default: comma).
    delimiter: char,
    /// Whether to include header row.
    include_header: bool,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvFormatter {
    /// Creates a new CSV formatter with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: ',',
            include_header: true,
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether to include a header row.
    #[must_use]
    pub const fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    /// Creates a tab-separated values (TSV) formatter.
    #[must_use]
    pub const fn tsv() -> Self {
        Self {
            delimiter: '\t',
            include_header: true,
        }
    }
}

/// Renders Unix seconds as ISO 8601, falling back to the raw number.
fn datetime(time: i64) -> String {
    DateTime::from_timestamp(time, 0).map_or_else(
        || time.to_string(),
        |dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
    )
}

impl Formatter for CsvFormatter {
    fn write_ticks<W: Write>(&self, ticks: &[Tick], mut writer: W) -> Result<(), FormatError> {
        let d = self.delimiter;

        if self.include_header {
            writeln!(
                writer,
                "time{d}datetime{d}open{d}high{d}low{d}close{d}mark{d}volume{d}trades"
            )?;
        }

        for tick in ticks {
            writeln!(
                writer,
                "{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}",
                tick.time,
                datetime(tick.time),
                tick.open,
                tick.high,
                tick.low,
                tick.close,
                tick.mark,
                tick.volume,
                tick.trades
            )?;
        }

        Ok(())
    }

    fn write_candles<W: Write>(&self, candles: &[Candle], mut writer: W) -> Result<(), FormatError> {
        let d = self.delimiter;

        if self.include_header {
            writeln!(writer, "time{d}datetime{d}open{d}high{d}low{d}close{d}volume")?;
        }

        for candle in candles {
            writeln!(
                writer,
                "{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}",
                candle.time,
                datetime(candle.time),
                candle.open,
                candle.high,
                candle.low,
                candle.close,
                candle.volume
            )?;
        }

        Ok(())
    }

    fn extension(&self) -> &str {
        if self.delimiter == '\t' { "tsv" } else { "csv" }
    }
}
