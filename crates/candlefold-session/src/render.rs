//! Render sinks: where merged candles end up.

use std::io::Write;
use std::sync::{Arc, Mutex};

use candlefold_aggregate::Candle;
use candlefold_format::{FormatError, Formatter, JsonFormatter};
use thiserror::Error;

/// Errors reported by a render sink.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The output could not be written.
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// The sink is gone and can no longer accept updates.
    #[error("Render target detached")]
    Detached,

    /// Any other sink failure.
    #[error("{0}")]
    Other(String),
}

/// The visual layer a session transcribes candles into.
///
/// A full reload goes through [`RenderSink::set_data`]; every live merge
/// goes through [`RenderSink::update`], which receives either a replacement
/// for the last candle or a new candle to append.
pub trait RenderSink: Send + 'static {
    /// Replaces everything shown.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink cannot accept the data.
    fn set_data(&mut self, candles: &[Candle]) -> Result<(), RenderError>;

    /// Replaces or appends the last candle.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink cannot accept the update.
    fn update(&mut self, candle: &Candle) -> Result<(), RenderError>;
}

impl<S: RenderSink + ?Sized> RenderSink for Box<S> {
    fn set_data(&mut self, candles: &[Candle]) -> Result<(), RenderError> {
        (**self).set_data(candles)
    }

    fn update(&mut self, candle: &Candle) -> Result<(), RenderError> {
        (**self).update(candle)
    }
}

/// One call received by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    /// A full reload.
    SetData {
        /// Candles handed over.
        candles: Vec<Candle>,
    },
    /// A live update.
    Update {
        /// The merged candle.
        candle: Candle,
    },
}

#[derive(Debug, Default)]
struct Recording {
    events: Vec<RenderEvent>,
    fail_updates: bool,
}

/// Sink that records every call; clones share the same recording.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    inner: Arc<Mutex<Recording>>,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every recorded event, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<RenderEvent> {
        self.inner
            .lock()
            .map_or_else(|_| Vec::new(), |rec| rec.events.clone())
    }

    /// Returns the candles of the last reload.
    #[must_use]
    pub fn last_data(&self) -> Option<Vec<Candle>> {
        self.events().into_iter().rev().find_map(|event| match event {
            RenderEvent::SetData { candles } => Some(candles),
            RenderEvent::Update { .. } => None,
        })
    }

    /// Returns the candles of every recorded update.
    #[must_use]
    pub fn updates(&self) -> Vec<Candle> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RenderEvent::Update { candle } => Some(candle),
                RenderEvent::SetData { .. } => None,
            })
            .collect()
    }

    /// Makes subsequent updates fail (or succeed again).
    pub fn fail_updates(&self, fail: bool) {
        if let Ok(mut rec) = self.inner.lock() {
            rec.fail_updates = fail;
        }
    }
}

impl RenderSink for RecordingSink {
    fn set_data(&mut self, candles: &[Candle]) -> Result<(), RenderError> {
        let mut rec = self.inner.lock().map_err(|_| RenderError::Detached)?;
        rec.events.push(RenderEvent::SetData {
            candles: candles.to_vec(),
        });
        Ok(())
    }

    fn update(&mut self, candle: &Candle) -> Result<(), RenderError> {
        let mut rec = self.inner.lock().map_err(|_| RenderError::Detached)?;
        if rec.fail_updates {
            return Err(RenderError::Other("update rejected".to_string()));
        }
        rec.events.push(RenderEvent::Update {
            candle: candle.clone(),
        });
        Ok(())
    }
}

/// Sink that streams candles as NDJSON to a writer.
///
/// Every reload writes all candles, one per line; every update writes one
/// line. The writer is flushed after each call.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
    formatter: JsonFormatter,
    skip_placeholders: bool,
}

impl<W: Write + Send + 'static> WriterSink<W> {
    /// Creates a sink writing to `writer`.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            formatter: JsonFormatter::ndjson(),
            skip_placeholders: false,
        }
    }

    /// Sets whether placeholder candles are left out of reloads.
    #[must_use]
    pub const fn with_skip_placeholders(mut self, skip: bool) -> Self {
        self.skip_placeholders = skip;
        self
    }

    /// Consumes the sink, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send + 'static> RenderSink for WriterSink<W> {
    fn set_data(&mut self, candles: &[Candle]) -> Result<(), RenderError> {
        if self.skip_placeholders {
            let real: Vec<Candle> = candles
                .iter()
                .filter(|c| !c.is_placeholder())
                .cloned()
                .collect();
            self.formatter.write_candles(&real, &mut self.writer)?;
        } else {
            self.formatter.write_candles(candles, &mut self.writer)?;
        }
        self.writer.flush().map_err(FormatError::from)?;
        Ok(())
    }

    fn update(&mut self, candle: &Candle) -> Result<(), RenderError> {
        self.formatter
            .write_candles(std::slice::from_ref(candle), &mut self.writer)?;
        self.writer.flush().map_err(FormatError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candlefold_types::Decimal;

    fn candle(time: i64) -> Candle {
        let one = Decimal::from(1_i64);
        Candle::new(time, one.clone(), one.clone(), one.clone(), one.clone(), one)
    }

    #[test]
    fn test_recording_sink_shares_state() {
        let recorder = RecordingSink::new();
        let mut sink = recorder.clone();

        sink.set_data(&[candle(0), candle(60)]).unwrap();
        sink.update(&candle(60)).unwrap();

        assert_eq!(recorder.events().len(), 2);
        assert_eq!(recorder.last_data().unwrap().len(), 2);
        assert_eq!(recorder.updates(), vec![candle(60)]);
    }

    #[test]
    fn test_recording_sink_failure_mode() {
        let mut sink = RecordingSink::new();
        sink.fail_updates(true);
        assert!(sink.update(&candle(0)).is_err());
        assert!(sink.set_data(&[]).is_ok());

        sink.fail_updates(false);
        assert!(sink.update(&candle(0)).is_ok());
        assert_eq!(sink.updates().len(), 1);
    }

    #[test]
    fn test_writer_sink_ndjson() {
        let mut sink = WriterSink::new(Vec::new()).with_skip_placeholders(true);
        sink.set_data(&[Candle::placeholder(0), candle(60)]).unwrap();
        sink.update(&candle(120)).unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"time\":60"));
        assert!(lines[1].contains("\"time\":120"));
    }
}
