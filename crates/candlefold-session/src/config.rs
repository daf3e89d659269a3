//! Session configuration.

use std::path::Path;

use candlefold_aggregate::TickLog;
use candlefold_types::{Interval, Result};
use serde::{Deserialize, Serialize};

/// Configuration for a chart session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Candle interval to load first.
    pub interval: Interval,
    /// Minimum number of candles handed to the sink on every reload.
    pub min_visible_candles: usize,
    /// Live ticks kept for replay after a reload.
    pub tick_log_capacity: usize,
    /// Capacity of the command queue between feed and session.
    pub queue_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            interval: Interval::MINUTE_30,
            min_visible_candles: 100,
            tick_log_capacity: TickLog::DEFAULT_CAPACITY,
            queue_capacity: 1024,
        }
    }
}

impl SessionConfig {
    /// Loads a configuration from a JSON file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Sets the initial interval.
    #[must_use]
    pub const fn with_interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the minimum number of visible candles.
    #[must_use]
    pub const fn with_min_visible_candles(mut self, count: usize) -> Self {
        self.min_visible_candles = count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.interval, Interval::MINUTE_30);
        assert_eq!(config.min_visible_candles, 100);
        assert_eq!(config.tick_log_capacity, 600);
        assert_eq!(config.queue_capacity, 1024);
    }

    #[test]
    fn test_from_json_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"interval": "5m", "min_visible_candles": 20}}"#).unwrap();

        let config = SessionConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.interval, Interval::MINUTE_5);
        assert_eq!(config.min_visible_candles, 20);
        assert_eq!(config.queue_capacity, 1024);
    }

    #[test]
    fn test_from_json_file_rejects_bad_interval() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"interval": "0m"}}"#).unwrap();

        assert!(SessionConfig::from_json_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SessionConfig::from_json_file(dir.path().join("nope.json")).is_err());
    }
}
