//! Kline decoding, HTTP client and live feeds for candlefold.
//!
//! This crate provides the data loading pipeline:
//!
//! - [`url::klines_url`] - Constructs kline history URLs
//! - [`KlineClient`] - HTTP client with retries
//! - [`decode_payload`] - Resilient wire record decoding
//! - [`HistoricalSource`] / [`LiveFeed`] - Seams for history and live ticks
//! - [`MockHistory`] / [`MockFeed`] - Seeded random-walk data

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candlefold/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod decode;
mod mock;
mod source;
pub mod url;

pub use client::{ClientConfig, DEFAULT_BASE_URL, FetchError, KlineClient};
pub use decode::{
    DecodeError, DecodedBatch, RejectedRecord, decode_klines, decode_klines_strict,
    decode_payload, decode_record,
};
pub use mock::{MockConfig, MockFeed, MockHistory};
pub use source::{ChannelFeed, HistoricalSource, LiveFeed, NoFeed, StaticHistory};
