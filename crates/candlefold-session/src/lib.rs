//! Live chart session for candlefold.
//!
//! This crate wires history, live ticks and rendering together:
//!
//! - [`ChartSession`] / [`SessionHandle`] - The session actor and its handle
//! - [`SessionState`] - Synchronous reload and tick-merge core
//! - [`RenderSink`] - Where merged candles are transcribed
//! - [`SessionConfig`] - Interval, padding and buffer settings

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candlefold/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod render;
mod session;
mod state;

pub use config::SessionConfig;
pub use render::{RecordingSink, RenderError, RenderEvent, RenderSink, WriterSink};
pub use session::{ChartSession, SessionHandle};
pub use state::SessionState;
