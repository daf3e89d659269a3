//! Core types for the candlefold tick-to-candle engine.
//!
//! This crate provides the fundamental data structures used throughout candlefold:
//!
//! - [`Decimal`] - Exact decimal value for prices and volumes
//! - [`Tick`] - A single market observation with OHLC, mark, volume and trade count
//! - [`RawKline`] - Scaled integer record as delivered on the wire
//! - [`Interval`] - Candle bucket width in seconds

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candlefold/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod decimal;
mod error;
mod interval;
mod tick;

pub use decimal::Decimal;
pub use error::{CandlefoldError, Result};
pub use interval::{Interval, IntervalParseError};
pub use tick::{RawKline, Tick};
