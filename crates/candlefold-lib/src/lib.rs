//! Tick-to-candle aggregation and incremental merge engine for live charts.
//!
//! This is a facade crate that re-exports functionality from the candlefold
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```
//! use candlefold_lib::prelude::*;
//!
//! let price = |s: &str| s.parse::<Decimal>().unwrap();
//! let ticks = vec![
//!     Tick::new(0, price("10"), price("11"), price("9"), price("10.5"), price("1")),
//!     Tick::new(30, price("10.5"), price("12"), price("10"), price("11"), price("2")),
//! ];
//!
//! let candles = aggregate(&ticks, Interval::MINUTE_1);
//! assert_eq!(candles[0].high, price("12"));
//! assert_eq!(candles[0].volume, price("3"));
//!
//! let mut series = SeriesState::from_series(candles);
//! let update = Candle::new(60, price("11"), price("11"), price("11"), price("11"), price("1"));
//! assert_eq!(series.apply(update), MergeOutcome::Appended);
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candlefold/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use candlefold_types::*;

// Re-export the candle engine
pub use candlefold_aggregate::{
    Candle, ChartCandle, MergeAction, MergeOutcome, SeriesState, TickLog, Timestamped, aggregate,
    open_candle, pad_to_minimum, pad_to_minimum_at, price_change_percent, rehydrate,
};

// Re-export fetch functionality
#[cfg(feature = "fetch")]
pub use candlefold_fetch::{
    ChannelFeed, ClientConfig, DEFAULT_BASE_URL, DecodeError, DecodedBatch, FetchError,
    HistoricalSource, KlineClient, LiveFeed, MockConfig, MockFeed, MockHistory, NoFeed,
    StaticHistory, decode_klines, decode_klines_strict, decode_payload,
};

// Re-export formatters
#[cfg(feature = "format")]
pub use candlefold_format::{CsvFormatter, FormatError, Formatter, JsonFormatter, JsonStyle};

// Re-export the session
#[cfg(feature = "session")]
pub use candlefold_session::{
    ChartSession, RecordingSink, RenderError, RenderSink, SessionConfig, SessionHandle,
    SessionState, WriterSink,
};

/// Prelude module for convenient imports.
///
/// ```
/// use candlefold_lib::prelude::*;
/// ```
pub mod prelude {
    pub use candlefold_types::{CandlefoldError, Decimal, Interval, RawKline, Result, Tick};

    pub use candlefold_aggregate::{
        Candle, MergeOutcome, SeriesState, TickLog, aggregate, pad_to_minimum, rehydrate,
    };

    #[cfg(feature = "fetch")]
    pub use candlefold_fetch::{HistoricalSource, KlineClient, LiveFeed, decode_payload};

    #[cfg(feature = "format")]
    pub use candlefold_format::{CsvFormatter, Formatter, JsonFormatter};

    #[cfg(feature = "session")]
    pub use candlefold_session::{ChartSession, RenderSink, SessionConfig, SessionHandle};
}
