//! `EventLogObserver<W>`: bridges `SimObserver` to an `EventLogWriter`.

use yard_core::Event;
use yard_fleet::{EntityStore, InstructionBook};
use yard_sim::{RunSummary, SimObserver};

use crate::writer::EventLogWriter;
use crate::{EventRecord, OutputError, OutputResult};

/// Rows buffered before a batch is handed to the writer.
pub const DEFAULT_BATCH: usize = 256;

/// A [`SimObserver`] that streams processed events to any
/// [`EventLogWriter`] backend (JSON, CSV, SQLite, …).
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.start()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct EventLogObserver<W: EventLogWriter> {
    writer:     W,
    batch:      Vec<EventRecord>,
    batch_size: usize,
    next_seq:   u64,
    last_error: Option<OutputError>,
}

impl<W: EventLogWriter> EventLogObserver<W> {
    pub fn new(writer: W) -> Self {
        Self::with_batch_size(writer, DEFAULT_BATCH)
    }

    pub fn with_batch_size(writer: W, batch_size: usize) -> Self {
        Self {
            writer,
            batch: Vec::with_capacity(batch_size.max(1)),
            batch_size: batch_size.max(1),
            next_seq: 0,
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after `sim.start()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn flush(&mut self) {
        if self.batch.is_empty() {
            return;
        }
        let result = self.writer.write_events(&self.batch);
        self.batch.clear();
        self.store_err(result);
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            tracing::warn!(error = %e, "event log write failed");
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: EventLogWriter> SimObserver for EventLogObserver<W> {
    fn on_event(&mut self, event: &Event, _entities: &EntityStore, _instructions: &InstructionBook) {
        self.batch.push(EventRecord::from_event(self.next_seq, event));
        self.next_seq += 1;
        if self.batch.len() >= self.batch_size {
            self.flush();
        }
    }

    fn on_sim_end(&mut self, summary: &RunSummary) {
        self.flush();
        let result = self.writer.write_summary(summary);
        self.store_err(result);
        let result = self.writer.finish();
        self.store_err(result);
    }
}
