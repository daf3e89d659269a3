//! Tick-to-candle aggregation for candlefold.
//!
//! This crate provides the candle engine:
//!
//! - [`Candle`] - OHLCV candle data structure
//! - [`aggregate`] - Bulk tick-to-candle aggregation
//! - [`SeriesState`] - Incremental merge of live updates into a series
//! - [`rehydrate`] / [`TickLog`] - Replay of buffered live ticks over a reloaded base
//! - [`pad_to_minimum`] - Placeholder padding for a minimum series length

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candlefold/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod aggregator;
mod candle;
mod merge;
mod padding;
mod replay;

pub use aggregator::{aggregate, open_candle};
pub use candle::{Candle, ChartCandle, price_change_percent};
pub use merge::{MergeAction, MergeOutcome, SeriesState, Timestamped};
pub use padding::{pad_to_minimum, pad_to_minimum_at};
pub use replay::{TickLog, rehydrate};
