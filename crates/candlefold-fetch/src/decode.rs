//! Kline record decoding from the API's JSON wire format.

use candlefold_types::{RawKline, Tick};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::FetchError;

/// Names of the wire record positions, in order.
const FIELD_NAMES: [&str; RawKline::FIELDS] = [
    "high",
    "low",
    "open",
    "close",
    "mark",
    "volume",
    "trades",
    "timestamp",
];

/// Errors that can occur while decoding a single kline record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The record is not a JSON array.
    #[error("Record is not an array")]
    NotAnArray,

    /// The record has the wrong number of fields.
    #[error("Invalid record length: {0} fields (expected {1})")]
    InvalidLength(usize, usize),

    /// A field is not an integer that fits the expected range.
    #[error("Invalid {field} value: {value}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// The value as it appeared on the wire.
        value: String,
    },
}

/// Ticks decoded from one batch, plus the records that were skipped.
#[derive(Debug, Clone, Default)]
pub struct DecodedBatch {
    /// Successfully decoded ticks, in input order.
    pub ticks: Vec<Tick>,
    /// Records that could not be decoded.
    pub rejected: Vec<RejectedRecord>,
}

impl DecodedBatch {
    /// Returns the number of records in the batch.
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.ticks.len() + self.rejected.len()
    }

    /// Returns true if every record decoded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// A record skipped during resilient decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    /// Position of the record in the batch.
    pub index: usize,
    /// Why it was rejected.
    pub error: DecodeError,
}

/// Decodes one wire record `[high, low, open, close, mark, volume, trades, timestampMillis]`.
///
/// Integral floating-point values (`150000.0`) are accepted, fractional ones
/// are not.
///
/// # Errors
///
/// Returns an error if the record is not an eight-element array of integers.
pub fn decode_record(record: &Value) -> Result<RawKline, DecodeError> {
    let fields = record.as_array().ok_or(DecodeError::NotAnArray)?;
    if fields.len() != RawKline::FIELDS {
        return Err(DecodeError::InvalidLength(fields.len(), RawKline::FIELDS));
    }

    let int = |idx: usize| field_i64(&fields[idx], FIELD_NAMES[idx]);
    let trades = int(6)?;
    let trades = u64::try_from(trades).map_err(|_| DecodeError::InvalidField {
        field: FIELD_NAMES[6],
        value: trades.to_string(),
    })?;

    Ok(RawKline {
        high: int(0)?,
        low: int(1)?,
        open: int(2)?,
        close: int(3)?,
        mark: int(4)?,
        volume: int(5)?,
        trades,
        timestamp_ms: int(7)?,
    })
}

/// Reads one numeric field as an `i64`.
fn field_i64(value: &Value, field: &'static str) -> Result<i64, DecodeError> {
    let invalid = || DecodeError::InvalidField {
        field,
        value: value.to_string(),
    };

    let Value::Number(number) = value else {
        return Err(invalid());
    };
    if let Some(v) = number.as_i64() {
        return Ok(v);
    }
    match number.as_f64() {
        Some(v) if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 => Ok(v as i64),
        _ => Err(invalid()),
    }
}

/// Decodes a batch of records, skipping the ones that fail.
///
/// Each skipped record is logged at `warn` and reported in
/// [`DecodedBatch::rejected`]; the rest of the batch is unaffected.
#[must_use]
pub fn decode_klines(records: &[Value]) -> DecodedBatch {
    let mut batch = DecodedBatch {
        ticks: Vec::with_capacity(records.len()),
        rejected: Vec::new(),
    };

    for (index, record) in records.iter().enumerate() {
        match decode_record(record) {
            Ok(raw) => batch.ticks.push(raw.normalize()),
            Err(error) => {
                warn!(index, batch_size = records.len(), %error, "skipping kline record");
                batch.rejected.push(RejectedRecord { index, error });
            }
        }
    }

    batch
}

/// Decodes a batch of records, failing on the first bad one.
///
/// # Errors
///
/// Returns [`FetchError::Decode`] carrying the batch size and the index of
/// the offending record.
pub fn decode_klines_strict(records: &[Value]) -> Result<Vec<Tick>, FetchError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            decode_record(record)
                .map(RawKline::normalize)
                .map_err(|source| FetchError::Decode {
                    batch_size: records.len(),
                    index,
                    source,
                })
        })
        .collect()
}

/// Decodes a kline API response body.
///
/// Accepts the `{ success, details, data: [...] }` envelope or a bare array
/// of records. A payload without a usable `data` array decodes to an empty
/// batch.
#[must_use]
pub fn decode_payload(payload: &Value) -> DecodedBatch {
    let records = match payload {
        Value::Array(records) => records,
        Value::Object(envelope) => {
            if let Some(Value::Bool(false)) = envelope.get("success") {
                let details = envelope
                    .get("details")
                    .and_then(|d| d.as_str())
                    .unwrap_or_default();
                debug!(details, "kline response reports failure");
            }
            match envelope.get("data") {
                Some(Value::Array(records)) => records,
                _ => {
                    warn!("no kline data in response");
                    return DecodedBatch::default();
                }
            }
        }
        _ => {
            warn!("no kline data in response");
            return DecodedBatch::default();
        }
    };

    decode_klines(records)
}
