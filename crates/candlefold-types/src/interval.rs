//! Candle interval definitions.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::str::FromStr;

/// Width of one candle bucket, in whole seconds.
///
/// Parsed from and displayed as `<n><unit>` strings such as `30s`, `15m`,
/// `4h` or `1d`. A bare number is taken as seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Interval(NonZeroU32);

const fn preset(seconds: u32) -> Interval {
    match NonZeroU32::new(seconds) {
        Some(seconds) => Interval(seconds),
        None => panic!("interval presets are non-zero"),
    }
}

impl Interval {
    /// 30-second candles.
    pub const SECOND_30: Self = preset(30);
    /// 1-minute candles.
    pub const MINUTE_1: Self = preset(60);
    /// 5-minute candles.
    pub const MINUTE_5: Self = preset(300);
    /// 15-minute candles.
    pub const MINUTE_15: Self = preset(900);
    /// 30-minute candles.
    pub const MINUTE_30: Self = preset(1800);
    /// 1-hour candles.
    pub const HOUR_1: Self = preset(3600);
    /// 4-hour candles.
    pub const HOUR_4: Self = preset(14_400);
    /// Daily candles.
    pub const DAY_1: Self = preset(86_400);

    /// Creates an interval of `seconds`, or `None` if zero.
    #[must_use]
    pub const fn from_seconds(seconds: u32) -> Option<Self> {
        match NonZeroU32::new(seconds) {
            Some(seconds) => Some(Self(seconds)),
            None => None,
        }
    }

    /// Returns the interval width in seconds.
    #[must_use]
    pub const fn seconds(&self) -> u32 {
        self.0.get()
    }

    /// Returns the interval width in seconds as `i64`, for timestamp math.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0.get() as i64
    }

    /// Returns the start of the bucket containing `time`.
    ///
    /// This is `floor(time / seconds) * seconds`, using floor division so
    /// that times before the epoch still map to a bucket at or below them.
    /// A bucket start below `i64::MIN` saturates to `i64::MIN`.
    #[must_use]
    pub const fn bucket(&self, time: i64) -> i64 {
        let width = self.as_i64();
        time.div_euclid(width).saturating_mul(width)
    }

    /// Returns the common interval presets, shortest first.
    #[must_use]
    pub const fn presets() -> &'static [Self] {
        &[
            Self::SECOND_30,
            Self::MINUTE_1,
            Self::MINUTE_5,
            Self::MINUTE_15,
            Self::MINUTE_30,
            Self::HOUR_1,
            Self::HOUR_4,
            Self::DAY_1,
        ]
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::MINUTE_30
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let seconds = self.seconds();
        match seconds {
            s if s % 86_400 == 0 => write!(f, "{}d", s / 86_400),
            s if s % 3600 == 0 => write!(f, "{}h", s / 3600),
            s if s % 60 == 0 => write!(f, "{}m", s / 60),
            s => write!(f, "{s}s"),
        }
    }
}

impl FromStr for Interval {
    type Err = IntervalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let invalid = || IntervalParseError(s.to_string());

        let (digits, multiplier) = match normalized.char_indices().last() {
            Some((idx, 's')) => (&normalized[..idx], 1),
            Some((idx, 'm')) => (&normalized[..idx], 60),
            Some((idx, 'h')) => (&normalized[..idx], 3600),
            Some((idx, 'd')) => (&normalized[..idx], 86_400),
            Some(_) => (normalized.as_str(), 1),
            None => return Err(invalid()),
        };

        let count: u32 = digits.parse().map_err(|_| invalid())?;
        count
            .checked_mul(multiplier)
            .and_then(Self::from_seconds)
            .ok_or_else(invalid)
    }
}

impl TryFrom<String> for Interval {
    type Error = IntervalParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Interval> for String {
    fn from(value: Interval) -> Self {
        value.to_string()
    }
}

/// Error returned when parsing an invalid interval string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalParseError(String);

impl std::fmt::Display for IntervalParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid interval '{}', expected a positive duration such as 30s, 1m, 15m, 1h or 1d",
            self.0
        )
    }
}

impl std::error::Error for IntervalParseError {}
