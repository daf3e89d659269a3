//! Command implementations for the candlefold CLI.

pub(crate) mod aggregate;
pub(crate) mod fetch;
pub(crate) mod intervals;
pub(crate) mod watch;
